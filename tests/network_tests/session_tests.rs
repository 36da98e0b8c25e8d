//! Tests for Client and Session
//!
//! These tests verify:
//! - One fresh connection per request, closed after the reply
//! - Parse failures and QUIT never contact the server
//! - Connection, timeout and framing failures are reported, not fatal
//! - Session state transitions

use std::io::{BufReader, Cursor, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver};
use framelink::network::{Client, Session, SessionState, Step};
use framelink::protocol::{read_frame, write_frame, Command};
use framelink::{Config, LinkError};

// =============================================================================
// Helper Functions
// =============================================================================

/// What the stub server does after reading a request frame
enum Reply {
    Frame(String),
    Raw(Vec<u8>),
    Hang,
}

/// Events observed by the stub server
#[derive(Debug, PartialEq)]
enum Event {
    Request(String),
    Closed,
}

/// Serve each connection with one request and one reply
fn spawn_stub<F>(respond: F) -> (String, Receiver<Event>)
where
    F: Fn(&str) -> Reply + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let (tx, rx) = channel::unbounded();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let stream = match stream {
                Ok(s) => s,
                Err(_) => break,
            };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut writer = stream;

            let request = match read_frame(&mut reader, 1024) {
                Ok(payload) => String::from_utf8(payload.to_vec()).unwrap(),
                Err(_) => continue,
            };
            let _ = tx.send(Event::Request(request.clone()));

            match respond(&request) {
                Reply::Frame(text) => write_frame(&mut writer, text.as_bytes()).unwrap(),
                Reply::Raw(bytes) => {
                    writer.write_all(&bytes).unwrap();
                    continue;
                }
                Reply::Hang => {
                    thread::sleep(Duration::from_millis(500));
                    continue;
                }
            }

            // Client must close its side after the reply
            if let Err(LinkError::IncompleteFrame { received: 0 }) = read_frame(&mut reader, 1024) {
                let _ = tx.send(Event::Closed);
            }
        }
    });

    (addr, rx)
}

/// Address with nothing listening on it
fn dead_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

fn session_for(addr: &str) -> Session {
    let config = Config::builder()
        .server_addr(addr)
        .read_timeout_ms(2000)
        .build();
    Session::new(Client::new(config)).with_prompt("")
}

fn run_session(session: &mut Session, input: &str) -> String {
    let mut output = Vec::new();
    session.run(Cursor::new(input.to_string()), &mut output).unwrap();
    String::from_utf8(output).unwrap()
}

// =============================================================================
// Request Cycle Tests
// =============================================================================

#[test]
fn test_session_sends_each_command_on_fresh_connection() {
    let (addr, events) = spawn_stub(|req| Reply::Frame(format!("reply:{}", req)));
    let mut session = session_for(&addr);

    let output = run_session(&mut session, "ls\ncd /tmp\n  pwd  \nquit\n");

    assert_eq!(output, "reply:LS\nreply:CD /tmp\nreply:PWD\nbye\n");
    assert_eq!(session.state(), SessionState::Terminated);

    let timeout = Duration::from_secs(2);
    for expected in ["LS", "CD /tmp", "PWD"] {
        assert_eq!(
            events.recv_timeout(timeout).unwrap(),
            Event::Request(expected.to_string())
        );
        assert_eq!(events.recv_timeout(timeout).unwrap(), Event::Closed);
    }
}

#[test]
fn test_client_request_returns_reply() {
    let (addr, _events) = spawn_stub(|_| Reply::Frame("/home/operator".to_string()));
    let client = Client::new(Config::builder().server_addr(&addr).build());

    let reply = client.request(&Command::PrintDir).unwrap();
    assert_eq!(reply, "/home/operator");
}

#[test]
fn test_client_refuses_to_send_quit() {
    let (addr, events) = spawn_stub(|_| Reply::Frame("unexpected".to_string()));
    let client = Client::new(Config::builder().server_addr(&addr).build());

    let result = client.request(&Command::Quit);
    assert!(matches!(result, Err(LinkError::InvalidArgument(_))));
    assert!(events.recv_timeout(Duration::from_millis(200)).is_err());
}

// =============================================================================
// Local Handling Tests
// =============================================================================

#[test]
fn test_parse_errors_do_not_contact_server() {
    let (addr, events) = spawn_stub(|_| Reply::Frame("unexpected".to_string()));
    let mut session = session_for(&addr);

    let output = run_session(&mut session, "foo\ncd\nquit\n");

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("error: Unknown command"));
    assert!(lines[1].starts_with("error: Invalid argument"));
    assert_eq!(lines[2], "bye");
    assert!(events.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn test_quit_stops_reading_input() {
    let (addr, events) = spawn_stub(|req| Reply::Frame(req.to_string()));
    let mut session = session_for(&addr);

    let output = run_session(&mut session, "QUIT\nls\n");

    assert_eq!(output, "bye\n");
    assert_eq!(session.state(), SessionState::Terminated);
    assert!(events.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn test_end_of_input_terminates() {
    let (addr, _events) = spawn_stub(|req| Reply::Frame(req.to_string()));
    let mut session = session_for(&addr);

    let output = run_session(&mut session, "ls\n");

    assert_eq!(output, "LS\n");
    assert_eq!(session.state(), SessionState::Terminated);
}

#[test]
fn test_blank_line_is_skipped() {
    let mut session = session_for(&dead_addr());
    let mut output: Vec<u8> = Vec::new();

    let step = session.handle_line("   \n", &mut output).unwrap();

    assert_eq!(step, Step::Continue);
    assert!(output.is_empty());
    assert_eq!(session.state(), SessionState::AwaitingInput);
}

#[test]
fn test_prompt_is_written_per_line() {
    let config = Config::builder().server_addr(dead_addr()).build();
    let mut session = Session::new(Client::new(config)).with_prompt("> ");
    let mut output = Vec::new();

    session.run(Cursor::new("\nquit\n"), &mut output).unwrap();

    assert_eq!(String::from_utf8(output).unwrap(), "> > bye\n");
}

// =============================================================================
// Failure Reporting Tests
// =============================================================================

#[test]
fn test_connection_failure_is_not_fatal() {
    let mut session = session_for(&dead_addr());

    let output = run_session(&mut session, "ls\npwd\nquit\n");

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("error: Cannot connect"));
    assert!(lines[1].starts_with("error: Cannot connect"));
    assert_eq!(lines[2], "bye");
}

#[test]
fn test_incomplete_reply_is_reported() {
    let (addr, _events) = spawn_stub(|req| {
        if req == "LS" {
            Reply::Raw(b"partial".to_vec())
        } else {
            Reply::Frame("fine".to_string())
        }
    });
    let mut session = session_for(&addr);

    let output = run_session(&mut session, "ls\npwd\nquit\n");

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("error: Incomplete frame"));
    assert_eq!(lines[1], "fine");
    assert_eq!(lines[2], "bye");
}

#[test]
fn test_read_timeout_is_reported() {
    let (addr, _events) = spawn_stub(|_| Reply::Hang);
    let config = Config::builder()
        .server_addr(&addr)
        .read_timeout_ms(100)
        .build();
    let mut session = Session::new(Client::new(config)).with_prompt("");
    let mut output: Vec<u8> = Vec::new();

    let step = session.handle_line("pwd", &mut output).unwrap();

    assert_eq!(step, Step::Continue);
    assert_eq!(session.state(), SessionState::AwaitingInput);
    assert!(String::from_utf8(output).unwrap().starts_with("error: IO error"));
}

#[test]
fn test_timeout_error_is_classified() {
    let (addr, _events) = spawn_stub(|_| Reply::Hang);
    let config = Config::builder()
        .server_addr(&addr)
        .read_timeout_ms(100)
        .build();
    let client = Client::new(config);

    let err = client.request(&Command::List).unwrap_err();
    assert!(err.is_timeout());
}

#[test]
fn test_request_stream_closes_on_drop() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let client = Client::new(Config::builder().server_addr(&addr).build());

    let stream = client.open().unwrap();
    let (accepted, _) = listener.accept().unwrap();
    drop(stream);

    let mut reader = BufReader::new(accepted);
    assert!(matches!(
        read_frame(&mut reader, 16),
        Err(LinkError::IncompleteFrame { received: 0 })
    ));
}
