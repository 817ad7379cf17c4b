use std::str::FromStr;

use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{tcp::OwnedWriteHalf, TcpListener, TcpStream},
    spawn,
};
use uuid::Uuid;
use lib_code::{Error, MAX_INPUT_TEXT};

pub const FIRMWARE_VERSION: &'static str = "V1.3";

#[derive(Debug, Eq, PartialEq)]
pub enum Command {
    Connect,
    Get(Switch),
    Set(Action, bool),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Switch {
    Opened,
    Closed,
    Locked,
    AuxState,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Open,
    Close,
    Abort,
    AuxSet,
}

impl FromStr for Switch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPENED" => Ok(Self::Opened),
            "CLOSED" => Ok(Self::Closed),
            "LOCKED" => Ok(Self::Locked),
            "AUXSTATE" => Ok(Self::AuxState),
            _ => Err(Error::InvalidTarget(s.to_string())),
        }
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "CLOSE" => Ok(Self::Close),
            "ABORT" => Ok(Self::Abort),
            "AUXSET" => Ok(Self::AuxSet),
            _ => Err(Error::InvalidTarget(s.to_string())),
        }
    }
}

fn on_off(value: &str) -> Result<bool, Error> {
    match value {
        "ON" => Ok(true),
        "OFF" => Ok(false),
        _ => Err(Error::InvalidValue(value.to_string())),
    }
}

/// Parses `(CMD:TARGET:VALUE)`, ignoring surrounding whitespace.
pub fn parse_command(raw: &str) -> Result<Command, Error> {
    let text = raw.trim();
    if text.len() > MAX_INPUT_TEXT {
        return Err(Error::TooLong(text.len()));
    }
    if text.is_empty() || text == "()" {
        return Err(Error::EmptyCommand);
    }

    let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) else {
        return Err(Error::ParseError);
    };
    let mut parts = inner.split(':');
    let (Some(command), Some(target), Some(value), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return Err(Error::ParseError);
    };

    match command {
        "CON" => Ok(Command::Connect),
        "GET" => Ok(Command::Get(target.parse()?)),
        "SET" => Ok(Command::Set(target.parse()?, on_off(value)?)),
        _ => Err(Error::CommandNotFound),
    }
}

/// Switch and relay state of one simulated roof. Movement completes instantly.
#[derive(Debug, Default)]
pub struct Roof {
    opened: bool,
    locked: bool,
    aux: bool,
}

impl Roof {
    pub fn apply(&mut self, command: &Command) -> String {
        match command {
            Command::Connect => ack("0", FIRMWARE_VERSION),
            Command::Get(switch) => {
                let on = match switch {
                    Switch::Opened => self.opened,
                    Switch::Closed => !self.opened,
                    Switch::Locked => self.locked,
                    Switch::AuxState => self.aux,
                };
                ack(switch_name(*switch), if on { "ON" } else { "OFF" })
            }
            Command::Set(action, value) => {
                match (*action, *value) {
                    (Action::Open, true) => self.opened = true,
                    (Action::Close, true) => self.opened = false,
                    (Action::AuxSet, aux) => self.aux = aux,
                    // nothing moves long enough to be stopped
                    (Action::Abort, _) | (_, false) => {}
                }
                ack(action_name(*action), if *value { "ON" } else { "OFF" })
            }
        }
    }
}

fn switch_name(switch: Switch) -> &'static str {
    match switch {
        Switch::Opened => "OPENED",
        Switch::Closed => "CLOSED",
        Switch::Locked => "LOCKED",
        Switch::AuxState => "AUXSTATE",
    }
}

fn action_name(action: Action) -> &'static str {
    match action {
        Action::Open => "OPEN",
        Action::Close => "CLOSE",
        Action::Abort => "ABORT",
        Action::AuxSet => "AUXSET",
    }
}

pub fn ack(target: &str, value: &str) -> String {
    format!("(ACK:{}:{})\n", target, value)
}

pub fn nak(err: &Error) -> String {
    format!("(NAK:ERROR:{})\n", err)
}

async fn send_reply(write_half: &mut OwnedWriteHalf, reply: &str) -> Result<(), Error> {
    write_half.write_all(reply.as_bytes()).await?;
    Ok(())
}

/// Reads one request into `buffer`, keeping at most `MAX_INPUT_TEXT + 1` bytes of it.
/// Leading whitespace is skipped. Returns the full request length; anything past
/// the kept bytes is discarded up to and including the next `)`.
async fn read_request<R>(reader: &mut R, buffer: &mut Vec<u8>) -> Result<usize, Error>
where
    R: AsyncBufRead + Unpin,
{
    buffer.clear();

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Err(Error::ConnectionClosed { received: 0 });
        }
        let skip = available.iter().take_while(|b| b.is_ascii_whitespace()).count();
        let only_whitespace = skip == available.len();
        reader.consume(skip);
        if !only_whitespace {
            break;
        }
    }

    (&mut *reader).take((MAX_INPUT_TEXT + 1) as u64).read_until(b')', buffer).await?;
    if buffer.last() == Some(&b')') {
        return Ok(buffer.len());
    }
    // without the closing parenthesis and under the limit the peer is gone
    if buffer.len() <= MAX_INPUT_TEXT {
        return Err(Error::ConnectionClosed { received: buffer.len() });
    }

    let mut size = buffer.len();
    loop {
        let (found, length) = {
            let available = reader.fill_buf().await?;
            (available.iter().position(|&b| b == b')'), available.len())
        };
        match (found, length) {
            (_, 0) => return Err(Error::ConnectionClosed { received: size }),
            (Some(at), _) => {
                reader.consume(at + 1);
                return Ok(size + at + 1);
            }
            (None, length) => {
                reader.consume(length);
                size += length;
            }
        }
    }
}

async fn roof_handle(stream: TcpStream, uuid: Uuid) -> Result<(), Error> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut buffer = Vec::with_capacity(MAX_INPUT_TEXT + 1);
    let mut roof = Roof::default();

    loop {
        let size = read_request(&mut reader, &mut buffer).await?;

        let request = String::from_utf8_lossy(&buffer);
        debug!("[{}] request: {:?} ({} bytes)", uuid, request, size);

        let command = if size > MAX_INPUT_TEXT {
            Err(Error::TooLong(size))
        } else {
            parse_command(&request)
        };
        let reply = match command {
            Ok(command) => roof.apply(&command),
            Err(err) => {
                warn!("[{}] rejected {:?}: {}", uuid, request.trim(), err);
                nak(&err)
            }
        };
        send_reply(&mut write_half, &reply).await?;
    }
}

pub async fn roof_server(listener: TcpListener) {
    match listener.local_addr() {
        Ok(addr) => info!("roof server listening on {}", addr),
        Err(err) => warn!("roof server listening on unknown address: {}", err),
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let uuid = Uuid::new_v4();
                info!("new client! addr: {} uuid: {}", addr, uuid);

                spawn(async move {
                    match roof_handle(stream, uuid).await {
                        Err(err) if err.unrecoverable_error() => info!("[{}] disconnected: {}", uuid, err),
                        Err(err) => error!("[{}] err: {}", uuid, err),
                        Ok(()) => {}
                    }
                });
            }
            Err(err) => error!("tcp server err: {}", err),
        }
    }
}
