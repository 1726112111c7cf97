use super::value::ValueArgs;
use crate::output;
use anyhow::{Context, Result};
use clap::Args;
use sflwire_shared::pickle;

#[derive(Args, Debug)]
pub struct PickleArgs {
    #[command(flatten)]
    pub value: ValueArgs,

    /// Separate bytes with spaces
    #[arg(long)]
    pub spaced: bool,
}

pub fn run(args: PickleArgs) -> Result<()> {
    let value = args.value.parse()?.context("--type is required")?;
    let bytes = pickle(&value);
    tracing::debug!("Pickled {} as {} bytes", value.type_name(), bytes.len());
    output::hex(&bytes, args.spaced);
    Ok(())
}
