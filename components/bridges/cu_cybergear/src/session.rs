//! Request/reply sessions with motors behind one adapter.
//!
//! The session is generic over any `Read + Write` transport. On hardware that
//! is the serial port from [`crate::serial`]; tests drive it with in-memory
//! buffers.

use crate::error::{SessionError, SessionResult};
use crate::messages::Reply;
use cu_cybergear_lib::frame::AT_MODE_COMMAND;
use cu_cybergear_lib::{
    CommandMode, ControlTarget, FrameReader, IdResponse, ParamValue, Register, Request, Response,
    RunMode, encode_frame,
};
use log::{debug, info, warn};
use std::io::{ErrorKind, Read, Write};

const READ_CHUNK: usize = 64;

pub struct DeviceSession<T> {
    transport: T,
    host_id: u8,
    reader: FrameReader,
    pending: Vec<u8>,
}

impl<T: Read + Write> DeviceSession<T> {
    pub fn new(transport: T, host_id: u8) -> Self {
        Self {
            transport,
            host_id,
            reader: FrameReader::new(),
            pending: Vec::with_capacity(READ_CHUNK),
        }
    }

    pub fn host_id(&self) -> u8 {
        self.host_id
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Put the adapter in AT framing mode. Its `OK` answer is skipped later by
    /// the frame reader.
    pub fn enter_at_mode(&mut self) -> SessionResult<()> {
        self.transport.write_all(AT_MODE_COMMAND)?;
        self.transport.flush()?;
        info!("adapter switched to AT mode");
        Ok(())
    }

    pub fn send(&mut self, request: &Request) -> SessionResult<()> {
        let frame = encode_frame(request);
        debug!("write: {} ({request:?})", hex::encode(frame));
        self.transport.write_all(&frame)?;
        self.transport.flush()?;
        Ok(())
    }

    /// Wait for the next frame.
    ///
    /// `Ok(None)` means the transport timed out or closed before a full frame
    /// arrived; any partial frame is dropped. Malformed frames are logged and
    /// skipped.
    pub fn receive(&mut self) -> SessionResult<Option<Reply>> {
        loop {
            if !self.pending.is_empty() {
                let (used, frame) = self.reader.push_slice(&self.pending);
                self.pending.drain(..used);
                match frame {
                    Some(Ok(raw)) => {
                        let reply = Reply::from_raw(raw)?;
                        debug!("read : {reply:?}");
                        return Ok(Some(reply));
                    }
                    Some(Err(e)) => {
                        warn!("dropping malformed frame: {e}");
                        continue;
                    }
                    None => {}
                }
            }

            let mut chunk = [0u8; READ_CHUNK];
            match self.transport.read(&mut chunk) {
                Ok(0) => return Ok(self.give_up()),
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(self.give_up());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// A short read is no reply: its bytes must not prefix the next frame.
    fn give_up(&mut self) -> Option<Reply> {
        if self.reader.in_frame() || !self.pending.is_empty() {
            debug!("discarding partial frame after timeout");
        }
        self.reader.reset();
        self.pending.clear();
        None
    }

    pub fn exchange(&mut self, request: &Request) -> SessionResult<Option<Reply>> {
        self.send(request)?;
        self.receive()
    }

    /// Ask `target` for its id. `None` when nothing, or something other than
    /// an id reply, came back.
    pub fn request_id(&mut self, target: u8) -> SessionResult<Option<IdResponse>> {
        let request = Request::IdQuery {
            target,
            host: self.host_id,
        };
        match self.exchange(&request)? {
            Some(Reply::Typed(Response::Id(id))) => Ok(Some(id)),
            _ => Ok(None),
        }
    }

    /// Probe every node id and return the first motor that answers.
    pub fn search_id(&mut self) -> SessionResult<u8> {
        for target in 0..=u8::MAX {
            match self.request_id(target) {
                Ok(Some(id)) => {
                    info!("motor {:#04x} answered the id search", id.node_id());
                    return Ok(id.node_id());
                }
                Ok(None) => {}
                Err(SessionError::Codec(e)) => debug!("node {target:#04x}: {e}"),
                Err(e) => return Err(e),
            }
        }
        Err(SessionError::NoDevice)
    }

    pub fn enable(&mut self, target: u8) -> SessionResult<Option<Reply>> {
        let host = self.host_id;
        self.exchange(&Request::Enable { target, host })
    }

    pub fn disable(&mut self, target: u8, clear_fault: bool) -> SessionResult<Option<Reply>> {
        let host = self.host_id;
        self.exchange(&Request::Disable {
            target,
            host,
            clear_fault,
        })
    }

    pub fn set_zero(&mut self, target: u8) -> SessionResult<Option<Reply>> {
        let host = self.host_id;
        self.exchange(&Request::SetZero { target, host })
    }

    /// Move `target` to `new_target`. The motor answers from its new id.
    pub fn set_id(&mut self, target: u8, new_target: u8) -> SessionResult<Option<Reply>> {
        let host = self.host_id;
        self.exchange(&Request::SetId {
            target,
            host,
            new_target,
        })
    }

    pub fn control(
        &mut self,
        target: u8,
        set_point: &ControlTarget,
    ) -> SessionResult<Option<Reply>> {
        self.exchange(&Request::Control {
            target,
            set_point: *set_point,
        })
    }

    pub fn read_param(&mut self, target: u8, register: Register) -> SessionResult<ParamValue> {
        let host = self.host_id;
        match self.exchange(&Request::ReadParam {
            target,
            host,
            register,
        })? {
            Some(Reply::Typed(Response::ParamRead(read))) => {
                if read.register != register {
                    warn!("asked for {register}, motor answered {}", read.register);
                }
                Ok(read.value)
            }
            Some(other) => Err(SessionError::UnexpectedReply {
                expected: CommandMode::ReadParam,
                found: other.command_mode(),
            }),
            None => Err(SessionError::NoReply(target)),
        }
    }

    /// Write one register. Values outside the documented range are sent
    /// anyway; the motor clamps or rejects them.
    pub fn write_param(
        &mut self,
        target: u8,
        register: Register,
        value: ParamValue,
    ) -> SessionResult<Option<Reply>> {
        if let Some(range) = register.limits() {
            let v = value.as_f32() as f64;
            if !range.contains(v) {
                warn!(
                    "{register} = {value} is outside {}..={}",
                    range.lo, range.hi
                );
            }
        }
        let host = self.host_id;
        self.exchange(&Request::WriteParam {
            target,
            host,
            register,
            value,
        })
    }

    pub fn run_mode(&mut self, target: u8) -> SessionResult<RunMode> {
        let value = self.read_param(target, Register::RunMode)?;
        Ok(RunMode::try_from(value)?)
    }

    pub fn set_run_mode(&mut self, target: u8, mode: RunMode) -> SessionResult<Option<Reply>> {
        self.write_param(target, Register::RunMode, mode.into())
    }
}
