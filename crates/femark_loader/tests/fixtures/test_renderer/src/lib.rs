//! Minimal renderer exporting the femark native ABI.
//!
//! `# Title` becomes `<h1>Title</h1>\n`; any other input is echoed back.
//! Two inputs are reserved: [`NULL_INPUT`] yields a NULL buffer and
//! [`INVALID_UTF8_INPUT`] yields bytes that are not UTF-8.

use std::ptr;
use std::slice;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const NULL_INPUT: &str = "!null";
pub const INVALID_UTF8_INPUT: &str = "!invalid-utf8";

static FREED_BUFFERS: AtomicUsize = AtomicUsize::new(0);

#[repr(C)]
pub struct FemarkBuffer {
    pub ptr: *mut u8,
    pub len: usize,
}

fn render(markdown: &str) -> Vec<u8> {
    if markdown == INVALID_UTF8_INPUT {
        return vec![0xff, 0xfe, 0xfd];
    }

    match markdown.strip_prefix("# ") {
        Some(title) => format!("<h1>{}</h1>\n", title.trim_end()).into_bytes(),
        None => markdown.as_bytes().to_vec(),
    }
}

/// # Safety
///
/// `input` must point to `input_len` readable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn process_markdown_to_html(input: *const u8, input_len: usize) -> FemarkBuffer {
    let null = FemarkBuffer {
        ptr: ptr::null_mut(),
        len: 0,
    };

    let bytes = unsafe { slice::from_raw_parts(input, input_len) };
    let Ok(markdown) = std::str::from_utf8(bytes) else {
        return null;
    };
    if markdown == NULL_INPUT {
        return null;
    }

    let output = render(markdown).into_boxed_slice();
    let len = output.len();
    FemarkBuffer {
        ptr: Box::into_raw(output).cast::<u8>(),
        len,
    }
}

/// # Safety
///
/// `buffer` must come from [`process_markdown_to_html`] and not be freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn free_html_buffer(buffer: FemarkBuffer) {
    if buffer.ptr.is_null() {
        return;
    }

    drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(buffer.ptr, buffer.len)) });
    FREED_BUFFERS.fetch_add(1, Ordering::SeqCst);
}

/// Number of buffers released through [`free_html_buffer`].
#[unsafe(no_mangle)]
pub extern "C" fn test_renderer_freed_buffers() -> usize {
    FREED_BUFFERS.load(Ordering::SeqCst)
}
