use super::value::ValueArgs;
use crate::output;
use anyhow::{bail, Context, Result};
use clap::Args;
use sflwire_agent::config::{OpenMode, DEFAULT_BUFFER_SIZE};
use sflwire_agent::{EventSink, FileSink};
use sflwire_shared::{Event, EventType, TaggedInt};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Event kind (e.g. line, def, function_exit)
    #[arg(value_name = "KIND")]
    pub event_type: EventType,

    /// Probe id
    #[arg(long, allow_negative_numbers = true)]
    pub event_id: i64,

    /// Variable id (def, use, len, test_def, test_use)
    #[arg(long, allow_negative_numbers = true)]
    pub var_id: Option<i64>,

    /// Observed length (len)
    #[arg(long, allow_negative_numbers = true)]
    pub length: Option<i64>,

    /// Branch outcome (condition)
    #[arg(long)]
    pub condition: Option<bool>,

    #[command(flatten)]
    pub value: ValueArgs,

    /// Keep the low 32 bits of out-of-range ids instead of failing
    #[arg(long)]
    pub wrap: bool,

    /// Append the frame to this trace file instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the event as JSON on stderr
    #[arg(long)]
    pub json: bool,

    /// Separate bytes with spaces
    #[arg(long)]
    pub spaced: bool,
}

pub fn run(args: EncodeArgs) -> Result<()> {
    let event = build_event(&args)?;
    if args.json {
        eprintln!("{}", serde_json::to_string_pretty(&event)?);
    }

    let frame = event.encode();

    match &args.output {
        Some(path) => {
            let mut sink = FileSink::with_options(path, DEFAULT_BUFFER_SIZE, OpenMode::Append)
                .context("Failed to open trace file")?;
            sink.write(&frame).context("Failed to write frame")?;
            sink.flush().context("Failed to flush trace file")?;
            output::success(&format!(
                "Appended {} frame ({} bytes) to {}",
                event.event_type(),
                frame.len(),
                sink.path().display()
            ));
        }
        None => output::hex(&frame, args.spaced),
    }

    Ok(())
}

fn build_event(args: &EncodeArgs) -> Result<Event> {
    let event_id = id(args.event_id, args.wrap).context("Invalid event id")?;

    let var_id = || -> Result<u32> {
        let raw = args
            .var_id
            .with_context(|| format!("--var-id is required for {} events", args.event_type))?;
        id(raw, args.wrap).context("Invalid variable id")
    };

    let event = match args.event_type {
        EventType::Line => Event::Line { event_id },
        EventType::Branch => Event::Branch { event_id },
        EventType::FunctionEnter => Event::FunctionEnter { event_id },
        EventType::FunctionExit => Event::FunctionExit {
            event_id,
            value: args.value.parse()?,
        },
        EventType::FunctionError => Event::FunctionError { event_id },
        EventType::Def => Event::Def {
            event_id,
            var_id: var_id()?,
            value: args.value.parse()?,
        },
        EventType::Use => Event::Use {
            event_id,
            var_id: var_id()?,
        },
        EventType::Condition => Event::Condition {
            event_id,
            value: args.condition.context("--condition is required for condition events")?,
        },
        EventType::LoopBegin => Event::LoopBegin { event_id },
        EventType::LoopHit => Event::LoopHit { event_id },
        EventType::LoopEnd => Event::LoopEnd { event_id },
        EventType::Len => {
            let raw = args.length.context("--length is required for len events")?;
            Event::Len {
                event_id,
                var_id: var_id()?,
                length: id(raw, args.wrap).context("Invalid length")?,
            }
        }
        EventType::TestStart => Event::TestStart { event_id },
        EventType::TestEnd => Event::TestEnd { event_id },
        EventType::TestLine => Event::TestLine { event_id },
        EventType::TestDef => Event::TestDef {
            event_id,
            var_id: var_id()?,
        },
        EventType::TestUse => Event::TestUse {
            event_id,
            var_id: var_id()?,
        },
        EventType::TestAssert => Event::TestAssert { event_id },
    };

    if args.value.kind.is_some()
        && !matches!(args.event_type, EventType::Def | EventType::FunctionExit)
    {
        bail!("{} events do not carry a value", args.event_type);
    }

    Ok(event)
}

fn id(raw: i64, wrap: bool) -> Result<u32> {
    if wrap {
        Ok(TaggedInt::wrapping(raw).get())
    } else {
        Ok(TaggedInt::checked(raw)?.get())
    }
}
