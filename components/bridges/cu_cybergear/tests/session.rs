use cu_cybergear::{DeviceSession, Reply, SessionError};
use cu_cybergear_lib::frame::AT_MODE_COMMAND;
use cu_cybergear_lib::{
    ControlTarget, ParamValue, RawMessage, Register, Response, RunMode, unwrap, wrap,
};
use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};

/// A single motor behind the adapter. Answers each host frame the way the
/// firmware does and times out when it has nothing to say.
struct SimMotor {
    node: u8,
    params: HashMap<u16, [u8; 4]>,
    enabled: bool,
    inbox: Vec<u8>,
    outbox: VecDeque<u8>,
}

impl SimMotor {
    fn new(node: u8) -> Self {
        Self {
            node,
            params: HashMap::new(),
            enabled: false,
            inbox: Vec::new(),
            outbox: VecDeque::new(),
        }
    }

    fn status(&self, host: u8) -> RawMessage {
        let phase = if self.enabled { 2 << 14 } else { 0 };
        // at rest, 28.5 C
        RawMessage::new(2, phase | self.node as u16, host)
            .with_payload(&[0xFF, 0x7F, 0xFF, 0x7F, 0xFF, 0x7F, 0x1D, 0x01])
    }

    fn handle(&mut self, msg: RawMessage) {
        if msg.node_id != self.node {
            return;
        }
        let host = (msg.aux_field & 0xFF) as u8;
        let reply = match msg.command_mode {
            0 => Some(RawMessage::new(0, self.node as u16, 0xFE).with_payload(&[0xA5; 8])),
            1 => Some(self.status(0xFD)),
            3 => {
                self.enabled = true;
                Some(self.status(host))
            }
            4 => {
                self.enabled = false;
                Some(self.status(host))
            }
            6 => Some(self.status(host)),
            17 => {
                let index = u16::from_le_bytes([msg.payload[0], msg.payload[1]]);
                let value = self.params.get(&index).copied().unwrap_or([0; 4]);
                let mut payload = msg.payload;
                payload[4..].copy_from_slice(&value);
                Some(RawMessage::new(17, self.node as u16, host).with_payload(&payload))
            }
            18 => {
                let index = u16::from_le_bytes([msg.payload[0], msg.payload[1]]);
                let mut value = [0; 4];
                value.copy_from_slice(&msg.payload[4..]);
                self.params.insert(index, value);
                None
            }
            _ => None,
        };
        if let Some(reply) = reply {
            self.outbox.extend(wrap(&reply));
        }
    }
}

impl Write for SimMotor {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inbox.extend_from_slice(buf);
        if self.inbox.starts_with(AT_MODE_COMMAND) {
            self.inbox.drain(..AT_MODE_COMMAND.len());
            self.outbox.extend(b"OK\r\n");
        }
        while self.inbox.len() >= 17 {
            let frame: Vec<u8> = self.inbox.drain(..17).collect();
            let msg = unwrap(&frame).map_err(io::Error::other)?;
            self.handle(msg);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for SimMotor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.outbox.is_empty() {
            return Err(io::ErrorKind::TimedOut.into());
        }
        let n = buf.len().min(self.outbox.len());
        for (slot, byte) in buf.iter_mut().zip(self.outbox.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

fn connect(node: u8) -> DeviceSession<SimMotor> {
    let mut session = DeviceSession::new(SimMotor::new(node), 0xFD);
    session.enter_at_mode().unwrap();
    session
}

#[test]
fn search_finds_the_motor() {
    let mut session = connect(0x7F);
    assert_eq!(session.search_id().unwrap(), 0x7F);
}

#[test]
fn search_reaches_the_last_id() {
    let mut session = connect(0xFF);
    assert_eq!(session.search_id().unwrap(), 0xFF);
}

#[test]
fn silent_bus_reports_no_device() {
    let mut session = DeviceSession::new(Mute, 0xFD);
    assert!(matches!(session.search_id(), Err(SessionError::NoDevice)));
}

struct Mute;

impl Read for Mute {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::ErrorKind::TimedOut.into())
    }
}

impl Write for Mute {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn enable_then_disable_reports_run_phase() {
    let mut session = connect(0x7F);

    let Some(Reply::Typed(Response::Status(on))) = session.enable(0x7F).unwrap() else {
        panic!("enable should answer with status");
    };
    assert_eq!(on.target_id, 0x7F);
    assert_eq!(on.host_id, 0xFD);
    assert!((on.temperature_c - 28.5).abs() < 1e-4);

    let Some(Reply::Typed(Response::Status(off))) = session.disable(0x7F, true).unwrap() else {
        panic!("disable should answer with status");
    };
    assert_ne!(on.run_phase, off.run_phase);
}

#[test]
fn run_mode_round_trip() {
    let mut session = connect(0x7F);
    assert_eq!(session.run_mode(0x7F).unwrap(), RunMode::Control);

    assert!(session.set_run_mode(0x7F, RunMode::Speed).unwrap().is_none());
    assert_eq!(session.run_mode(0x7F).unwrap(), RunMode::Speed);
}

#[test]
fn float_parameter_round_trip() {
    let mut session = connect(0x7F);
    session
        .write_param(0x7F, Register::LimitCur, ParamValue::Float(4.5))
        .unwrap();
    assert_eq!(
        session.read_param(0x7F, Register::LimitCur).unwrap(),
        ParamValue::Float(4.5)
    );
}

#[test]
fn control_frame_gets_status() {
    let mut session = connect(0x01);
    let set_point = ControlTarget {
        torque: -1.0,
        angle: 0.5,
        speed: 0.0,
        kp: 10.0,
        kd: 0.5,
    };
    let reply = session.control(0x01, &set_point).unwrap();
    assert!(matches!(reply, Some(Reply::Typed(Response::Status(_)))));
}

#[test]
fn wrong_target_times_out() {
    let mut session = connect(0x7F);
    assert!(session.set_zero(0x10).unwrap().is_none());
    assert!(matches!(
        session.read_param(0x10, Register::Vbus),
        Err(SessionError::NoReply(0x10))
    ));
}
