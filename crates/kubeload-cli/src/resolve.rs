//! # Resolve Subcommand
//!
//! Explains which type an `apiVersion`/`kind` pair resolves to.

use std::io::Write;

use clap::Args;
use kubeload_core::{resolve_meta, DecodeError, TypeMeta, TypeRegistry};

/// Arguments for the resolve subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// e.g. `apps/v1`.
    #[arg(long)]
    pub api_version: String,

    /// e.g. `Deployment`.
    #[arg(long)]
    pub kind: String,
}

/// Print each candidate name and whether it is registered, then the
/// resolved type. Fails when no candidate matches.
pub fn run(args: &ResolveArgs, registry: &TypeRegistry, out: &mut impl Write) -> anyhow::Result<()> {
    let meta = TypeMeta {
        api_version: &args.api_version,
        kind: &args.kind,
    };
    for candidate in meta.candidate_names() {
        let status = if registry.contains(&candidate) { "found" } else { "missing" };
        writeln!(out, "candidate {candidate}: {status}")?;
    }

    let descriptor = resolve_meta(registry, &meta).ok_or_else(|| DecodeError::UnresolvedType {
        api_version: args.api_version.clone(),
        kind: args.kind.clone(),
    })?;
    writeln!(out, "resolved {}", descriptor.name())?;
    Ok(())
}
