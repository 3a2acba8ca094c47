//! Command line probe for CyberGear motors on an AT adapter.
//!
//! ```sh
//! cargo run --bin cybergear-probe -- --device /dev/ttyUSB0 search
//! cargo run --bin cybergear-probe -- --target 0x7f mode speed
//! cargo run --bin cybergear-probe -- --target 0x7f control 0.5 1.0 2.0 20 1
//! cargo run --bin cybergear-probe -- decode "41 54 10 00 03 fc 08 00 00 00 00 00 00 00 00 0d 0a"
//! ```
//!
//! Link settings come from `--config` (JSON, see [`BridgeConfig`]) and are
//! overridden by the flags. Without `--target` the motor is found with an id
//! search first. Replies print as JSON on stdout; logs go to stderr.

use clap::{Parser, Subcommand};
use cu_cybergear::messages::{Reply, parse_hex};
use cu_cybergear::{BridgeConfig, DeviceSession};
use cu_cybergear_lib::register::{REGISTERS, Repr};
use cu_cybergear_lib::{ControlTarget, ParamValue, Register, RunMode, unwrap};
use log::{LevelFilter, info};
use serde::Serialize;
use serialport::SerialPort;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "cybergear-probe",
    about = "Talk to CyberGear motors through an AT serial-to-CAN adapter"
)]
struct Args {
    /// Bridge config JSON; flags below override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "PORT")]
    device: Option<String>,

    #[arg(long)]
    baud: Option<u32>,

    #[arg(long, value_parser = parse_id)]
    host: Option<u8>,

    /// Motor node id. Searched for when omitted.
    #[arg(long, value_parser = parse_id)]
    target: Option<u8>,

    /// -v for info, -vv for every frame.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Probe ids 0..=255 and print the first motor that answers.
    Search,
    Enable,
    Disable {
        #[arg(long)]
        clear_fault: bool,
    },
    /// Make the current position the mechanical zero.
    Zero,
    SetId {
        #[arg(value_parser = parse_id)]
        new_id: u8,
    },
    Read {
        register: Register,
    },
    /// Write a register. `run_mode` also takes a mode name.
    Write {
        register: Register,
        value: String,
    },
    /// Print the run mode, or switch it when one is given.
    Mode {
        run_mode: Option<RunMode>,
    },
    /// One operation control frame.
    #[command(allow_negative_numbers = true)]
    Control {
        torque: f64,
        angle: f64,
        speed: f64,
        kp: f64,
        kd: f64,
    },
    /// List the register table.
    Registers,
    /// Decode a frame given as hex. Needs no adapter.
    Decode {
        hex: String,
    },
    /// Write the effective link settings to a config file.
    SaveConfig {
        path: PathBuf,
    },
}

/// Decimal or `0x` prefixed hex.
fn parse_id(text: &str) -> Result<u8, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => u8::from_str_radix(digits, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("{text:?} is not a node id: {e}"))
}

fn parse_value(register: Register, text: &str) -> Result<ParamValue, Box<dyn Error>> {
    if register == Register::RunMode {
        if let Ok(mode) = text.parse::<RunMode>() {
            return Ok(mode.into());
        }
    }
    Ok(match register.repr() {
        Repr::F32 => ParamValue::Float(text.parse()?),
        Repr::U8 | Repr::U16 => ParamValue::Int(text.parse()?),
    })
}

#[derive(Serialize)]
struct RegisterRow {
    name: &'static str,
    index: String,
    repr: Repr,
    min: Option<f64>,
    max: Option<f64>,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_reply(reply: Option<Reply>) -> Result<(), Box<dyn Error>> {
    match reply {
        Some(reply) => print_json(&reply),
        None => {
            println!("null");
            Ok(())
        }
    }
}

fn resolve_config(args: &Args) -> Result<BridgeConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(device) = &args.device {
        config.device = device.clone();
    }
    if let Some(baud) = args.baud {
        config.baud_rate = baud;
    }
    if let Some(host) = args.host {
        config.host_id = host;
    }
    Ok(config)
}

fn pick_target(
    session: &mut DeviceSession<Box<dyn SerialPort>>,
    target: Option<u8>,
) -> Result<u8, Box<dyn Error>> {
    match target {
        Some(id) => Ok(id),
        None => {
            let id = session.search_id()?;
            info!("using motor {id:#04x}");
            Ok(id)
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let config = resolve_config(&args)?;

    // offline commands
    match &args.command {
        Command::Registers => {
            let rows: Vec<RegisterRow> = REGISTERS
                .iter()
                .map(|r| RegisterRow {
                    name: r.name(),
                    index: format!("{:#06x}", r.index()),
                    repr: r.repr(),
                    min: r.limits().map(|l| l.lo),
                    max: r.limits().map(|l| l.hi),
                })
                .collect();
            return print_json(&rows);
        }
        Command::Decode { hex } => {
            let bytes = parse_hex(hex)?;
            let reply = Reply::from_raw(unwrap(&bytes)?)?;
            return print_json(&reply);
        }
        Command::SaveConfig { path } => {
            config.save(path)?;
            info!("saved link settings to {}", path.display());
            return Ok(());
        }
        _ => {}
    }

    let mut session = DeviceSession::open(&config)?;

    if let Command::Search = args.command {
        let id = session.search_id()?;
        return print_json(&serde_json::json!({ "node_id": id }));
    }

    let target = pick_target(&mut session, args.target)?;
    match args.command {
        Command::Enable => print_reply(session.enable(target)?),
        Command::Disable { clear_fault } => print_reply(session.disable(target, clear_fault)?),
        Command::Zero => print_reply(session.set_zero(target)?),
        Command::SetId { new_id } => print_reply(session.set_id(target, new_id)?),
        Command::Read { register } => {
            let value = session.read_param(target, register)?;
            print_json(&serde_json::json!({ "register": register, "value": value }))
        }
        Command::Write { register, value } => {
            let value = parse_value(register, &value)?;
            print_reply(session.write_param(target, register, value)?)
        }
        Command::Mode { run_mode: None } => {
            let mode = session.run_mode(target)?;
            print_json(&mode)
        }
        Command::Mode {
            run_mode: Some(mode),
        } => print_reply(session.set_run_mode(target, mode)?),
        Command::Control {
            torque,
            angle,
            speed,
            kp,
            kd,
        } => {
            let set_point = ControlTarget {
                torque,
                angle,
                speed,
                kp,
                kd,
            };
            print_reply(session.control(target, &set_point)?)
        }
        Command::Search
        | Command::Registers
        | Command::Decode { .. }
        | Command::SaveConfig { .. } => Ok(()),
    }
}

fn main() {
    if let Err(e) = run(Args::parse()) {
        eprintln!("cybergear-probe: {e}");
        std::process::exit(1);
    }
}
