//! # Types Subcommand
//!
//! Lists the registered types, optionally with their fields.

use std::io::Write;

use clap::Args;
use kubeload_core::TypeRegistry;

/// Arguments for the types subcommand.
#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Also print each field as `name (key): signature`.
    #[arg(long)]
    pub fields: bool,

    /// Only types whose name contains this text, ignoring case.
    #[arg(long)]
    pub filter: Option<String>,
}

/// Print the matching types in name order.
pub fn run(args: &TypesArgs, registry: &TypeRegistry, out: &mut impl Write) -> anyhow::Result<()> {
    let filter = args.filter.as_deref().map(str::to_lowercase);
    for descriptor in registry.iter() {
        if let Some(filter) = &filter {
            if !descriptor.name().to_lowercase().contains(filter.as_str()) {
                continue;
            }
        }
        writeln!(out, "{}", descriptor.name())?;
        if args.fields {
            for field in descriptor.fields() {
                writeln!(out, "  {} ({}): {}", field.name(), field.key(), field.signature())?;
            }
        }
    }
    Ok(())
}
