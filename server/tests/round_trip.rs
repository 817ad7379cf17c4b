use std::time::Duration;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};
use lib_code::*;
use server::roof_server;

async fn start_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(roof_server(listener));
    port
}

fn config(port: u16, frame: FrameRule) -> ClientConfig {
    ClientConfig {
        server: "127.0.0.1".to_string(),
        port,
        frame,
        timeout: Some(Duration::from_secs(5)),
        ..ClientConfig::default()
    }
}

#[tokio::test]
async fn session_talks_to_roof() {
    let port = start_server().await;
    let mut session = connect(&config(port, FrameRule::Rolloffino)).await.unwrap();

    let reply = session.exchange(&encode_request("(CON:0:0)", false)).await.unwrap();
    assert_eq!(reply, "(ACK:0:V1.3)\n");

    session.exchange(&encode_request("(SET:OPEN:ON)", true)).await.unwrap();
    let reply = session.exchange(&encode_request("(GET:OPENED:0)", true)).await.unwrap();
    assert_eq!(reply, "(ACK:OPENED:ON)\n");

    let reply = session.exchange(b"(FLY:0:0)").await.unwrap();
    assert_eq!(reply, "(NAK:ERROR:command not found)\n");
}

#[tokio::test]
async fn each_connection_has_its_own_roof() {
    let port = start_server().await;

    let mut first = connect(&config(port, FrameRule::Line)).await.unwrap();
    first.exchange(b"(SET:OPEN:ON)").await.unwrap();

    let mut second = connect(&config(port, FrameRule::Line)).await.unwrap();
    let reply = second.exchange(b"(GET:OPENED:0)").await.unwrap();
    assert_eq!(reply, "(ACK:OPENED:OFF)\n");
}

#[tokio::test]
async fn console_runs_until_exit() {
    let port = start_server().await;
    let mut session = connect(&config(port, FrameRule::Rolloffino)).await.unwrap();
    let mut input = BufReader::new(&b"(CON:0:0)\n(GET:CLOSED:0)\nExit\n"[..]);
    let mut output = Vec::new();

    let exchanged = run_console(&mut session, &mut input, &mut output, false).await.unwrap();
    assert_eq!(exchanged, 2);

    let printed = String::from_utf8(output).unwrap();
    assert!(printed.contains("*****\"(ACK:CLOSED:ON)\\n\"*****"));
    assert_eq!(printed.matches(PROMPT).count(), 3);
}

#[tokio::test]
async fn server_drops_nothing_between_requests() {
    let port = start_server().await;
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    // two commands in one write are answered in order
    stream.write_all(b"(CON:0:0)(GET:LOCKED:0)").await.unwrap();
    let expected = b"(ACK:0:V1.3)\n(ACK:LOCKED:OFF)\n";
    let mut replies = vec![0u8; expected.len()];
    stream.read_exact(&mut replies).await.unwrap();
    assert_eq!(&replies, expected);
}

#[tokio::test]
async fn connection_survives_a_nak() {
    let port = start_server().await;
    let mut session = connect(&config(port, FrameRule::Rolloffino)).await.unwrap();

    let reply = session.exchange(b"(FLY:0:0)").await.unwrap();
    assert_eq!(reply, "(NAK:ERROR:command not found)\n");

    let reply = session.exchange(b"(CON:0:0)").await.unwrap();
    assert_eq!(reply, "(ACK:0:V1.3)\n");
}

#[tokio::test]
async fn too_long_request_is_rejected_then_served() {
    let port = start_server().await;
    let mut session = connect(&config(port, FrameRule::Rolloffino)).await.unwrap();

    let long = format!("(SET:OPEN:{})", "O".repeat(MAX_INPUT_TEXT));
    let reply = session.exchange(long.as_bytes()).await.unwrap();
    assert_eq!(reply, format!("(NAK:ERROR:command too long: {} bytes)\n", long.len()));

    let reply = session.exchange(b"(GET:CLOSED:0)").await.unwrap();
    assert_eq!(reply, "(ACK:CLOSED:ON)\n");
}

#[tokio::test]
async fn huge_request_is_discarded_without_dropping_the_connection() {
    let port = start_server().await;
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    let mut huge = vec![b'A'; 4 * 1024 * 1024];
    huge.push(b')');
    huge.extend_from_slice(b"(CON:0:0)");
    stream.write_all(&huge).await.unwrap();

    let expected = format!(
        "(NAK:ERROR:command too long: {} bytes)\n(ACK:0:V1.3)\n",
        4 * 1024 * 1024 + 1
    );
    let mut replies = vec![0u8; expected.len()];
    stream.read_exact(&mut replies).await.unwrap();
    assert_eq!(String::from_utf8(replies).unwrap(), expected);
}
