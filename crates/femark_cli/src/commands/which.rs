//! Which command implementation

use miette::{IntoDiagnostic, Result};

use femark_loader::{BindingResolver, HostFacts, LoaderConfig};

pub fn run_which(config: LoaderConfig) -> Result<()> {
    let host = HostFacts::detect();
    println!("host: {}", host);

    let plan = BindingResolver::new(config).plan(&host).into_diagnostic()?;

    let status = if plan.local.exists() {
        "present"
    } else {
        "missing"
    };
    println!("artifact: {}", plan.key);
    println!("local: {} ({})", plan.local.display(), status);
    match plan.package {
        Some(package) => println!("package: {}", package),
        None => println!("package: disabled"),
    }

    Ok(())
}
