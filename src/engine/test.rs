//! Scenario and law tests driven directly against [`EngineInner`] (no
//! network involved).

use super::EngineInner;
use crate::client::{ConnId, Frame};
use crate::registry::Registry;
use ircrelay_tokens::Message;
use tokio::sync::mpsc;

type Queue = mpsc::UnboundedReceiver<Frame>;

fn new_engine() -> EngineInner {
    EngineInner {
        domain: "server".to_owned(),
        nicklen: 32,
        channellen: 64,
        registry: Registry::new(),
    }
}

fn connect(engine: &mut EngineInner) -> (ConnId, Queue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (engine.registry.attach(tx), rx)
}

/// Connect and complete registration with `nick`, discarding the welcome
/// burst so callers can assert on what happens next.
fn register(engine: &mut EngineInner, nick: &str) -> (ConnId, Queue) {
    let (id, mut rx) = connect(engine);
    send(engine, id, &format!("NICK {}\r\n", nick));
    drain(&mut rx);
    (id, rx)
}

fn send(engine: &mut EngineInner, id: ConnId, line: &str) {
    let msg = Message::parse(line).expect("well-formed test input");
    engine.handle_message(id, msg);
}

fn drain(rx: &mut Queue) -> String {
    let mut out = String::new();
    while let Ok(frame) = rx.try_recv() {
        out.push_str(&String::from_utf8_lossy(frame.as_ref()));
    }
    out
}

// --- Scenarios ---------------------------------------------------------

#[test]
fn scenario_1_registration() {
    let mut engine = new_engine();
    let (id, mut rx) = connect(&mut engine);
    send(&mut engine, id, "NICK alice\r\n");
    assert_eq!(
        drain(&mut rx),
        ":server 001 alice :Welcome\r\n:server 422 alice :MOTD File is missing\r\n"
    );
}

#[test]
fn scenario_2_collision_leaves_challenger_unregistered() {
    let mut engine = new_engine();
    let (_alice, _arx) = register(&mut engine, "alice");
    let (bob, mut brx) = connect(&mut engine);

    send(&mut engine, bob, "NICK alice\r\n");

    assert_eq!(drain(&mut brx), ":server 433 * alice :Nickname is already in use\r\n");
    assert!(!engine.registry.is_registered(bob));
}

#[test]
fn scenario_3_direct_message() {
    let mut engine = new_engine();
    let (alice, mut arx) = register(&mut engine, "alice");
    let (bob, mut brx) = register(&mut engine, "bob");

    send(&mut engine, bob, "PRIVMSG alice :hi\r\n");

    assert_eq!(drain(&mut arx), ":bob PRIVMSG alice :hi\r\n");
    assert_eq!(drain(&mut brx), "");
}

#[test]
fn scenario_4_join_echo_then_names() {
    let mut engine = new_engine();
    let (alice, mut arx) = register(&mut engine, "alice");

    send(&mut engine, alice, "JOIN #chan\r\n");
    assert_eq!(
        drain(&mut arx),
        ":alice JOIN :#chan\r\n:server 353 alice = #chan :alice\r\n\
         :server 366 alice #chan :End of /NAMES list.\r\n"
    );

    let (bob, mut brx) = register(&mut engine, "bob");
    send(&mut engine, bob, "JOIN #chan\r\n");

    assert_eq!(drain(&mut arx), ":bob JOIN :#chan\r\n");
    assert_eq!(
        drain(&mut brx),
        ":bob JOIN :#chan\r\n:server 353 bob = #chan :alice bob\r\n\
         :server 366 bob #chan :End of /NAMES list.\r\n"
    );
}

#[test]
fn nick_rename_fans_out_to_caller_and_roommates_once_each() {
    let mut engine = new_engine();
    let (alice, mut arx) = register(&mut engine, "alice");
    let (bob, mut brx) = register(&mut engine, "bob");
    send(&mut engine, alice, "JOIN #chan\r\n");
    drain(&mut arx);
    send(&mut engine, bob, "JOIN #chan\r\n");
    drain(&mut arx);
    drain(&mut brx);

    send(&mut engine, alice, "NICK alicia\r\n");

    assert_eq!(drain(&mut arx), ":alice NICK :alicia\r\n");
    assert_eq!(drain(&mut brx), ":alice NICK :alicia\r\n");
    assert_eq!(engine.registry.identity(alice), Some("alicia"));
    assert_eq!(engine.registry.find_by_nick("alicia"), Some(alice));
}

#[test]
fn scenario_5_channel_broadcast_excludes_sender() {
    let mut engine = new_engine();
    let (alice, mut arx) = register(&mut engine, "alice");
    let (bob, mut brx) = register(&mut engine, "bob");
    send(&mut engine, alice, "JOIN #chan\r\n");
    drain(&mut arx);
    send(&mut engine, bob, "JOIN #chan\r\n");
    drain(&mut arx);
    drain(&mut brx);

    send(&mut engine, alice, "PRIVMSG #chan :hello\r\n");

    assert_eq!(drain(&mut brx), ":alice PRIVMSG #chan :hello\r\n");
    assert_eq!(drain(&mut arx), "");
}

#[test]
fn scenario_6_quit_fanout_and_nick_reuse() {
    let mut engine = new_engine();
    let (alice, mut arx) = register(&mut engine, "alice");
    let (bob, mut brx) = register(&mut engine, "bob");
    let (carol, mut crx) = register(&mut engine, "carol");

    for id in [alice, bob, carol] {
        send(&mut engine, id, "JOIN #chan\r\n");
    }
    drain(&mut arx);
    drain(&mut brx);
    drain(&mut crx);

    send(&mut engine, bob, "JOIN #other\r\n");
    drain(&mut brx);
    send(&mut engine, carol, "JOIN #other\r\n");
    drain(&mut brx);
    drain(&mut crx);

    send(&mut engine, bob, "QUIT :bye\r\n");

    assert_eq!(drain(&mut arx), ":bob QUIT :bye\r\n");
    assert_eq!(drain(&mut crx), ":bob QUIT :bye\r\n");
    assert!(engine.registry.room_exists("#chan"));
    assert!(engine.registry.room_exists("#other"));

    let (new_bob, mut nrx) = connect(&mut engine);
    send(&mut engine, new_bob, "NICK bob\r\n");
    assert_eq!(
        drain(&mut nrx),
        ":server 001 bob :Welcome\r\n:server 422 bob :MOTD File is missing\r\n"
    );
}

#[test]
fn room_name_casing_is_fixed_by_whoever_created_it() {
    let mut engine = new_engine();
    let (alice, mut arx) = register(&mut engine, "alice");
    let (bob, mut brx) = register(&mut engine, "bob");

    send(&mut engine, alice, "JOIN #Chan\r\n");
    drain(&mut arx);

    send(&mut engine, bob, "JOIN #chan\r\n");
    assert_eq!(drain(&mut arx), ":bob JOIN :#Chan\r\n");
    assert_eq!(
        drain(&mut brx),
        ":bob JOIN :#Chan\r\n:server 353 bob = #Chan :alice bob\r\n\
         :server 366 bob #Chan :End of /NAMES list.\r\n"
    );

    send(&mut engine, alice, "PRIVMSG #CHAN :hello\r\n");
    assert_eq!(drain(&mut brx), ":alice PRIVMSG #Chan :hello\r\n");

    send(&mut engine, bob, "PART #chan\r\n");
    assert_eq!(drain(&mut arx), ":bob PART #Chan\r\n");
    assert_eq!(drain(&mut brx), ":bob PART #Chan\r\n");
}

// --- Laws ---------------------------------------------------------------

#[test]
fn law_register_rename_idempotence() {
    let mut engine = new_engine();
    let (id, mut rx) = connect(&mut engine);
    send(&mut engine, id, "NICK foo\r\n");
    drain(&mut rx);

    send(&mut engine, id, "NICK foo\r\n");
    assert_eq!(drain(&mut rx), "");
    send(&mut engine, id, "NICK FOO\r\n");
    assert_eq!(drain(&mut rx), "");
}

#[test]
fn law_join_then_part_restores_prior_state() {
    let mut engine = new_engine();
    let (alice, mut rx) = register(&mut engine, "alice");

    send(&mut engine, alice, "JOIN #room\r\n");
    drain(&mut rx);
    assert!(engine.registry.room_exists("#room"));

    send(&mut engine, alice, "PART #room\r\n");
    drain(&mut rx);
    assert!(!engine.registry.room_exists("#room"));
    assert!(!engine.registry.is_member(alice, "#room"));
}

#[test]
fn law_disconnect_fanout_matches_for_quit_and_peer_close() {
    for reason in ["bye", crate::lines::CONNECTION_CLOSED] {
        let mut engine = new_engine();
        let (alice, mut arx) = register(&mut engine, "alice");
        let (bob, mut brx) = register(&mut engine, "bob");
        send(&mut engine, alice, "JOIN #chan\r\n");
        drain(&mut arx);
        send(&mut engine, bob, "JOIN #chan\r\n");
        drain(&mut arx);
        drain(&mut brx);

        engine.disconnect(bob, reason);

        assert_eq!(drain(&mut arx), format!(":bob QUIT :{}\r\n", reason));
    }
}

#[test]
fn law_privmsg_order_is_preserved_per_sender() {
    let mut engine = new_engine();
    let (alice, mut arx) = register(&mut engine, "alice");
    let (bob, mut brx) = register(&mut engine, "bob");
    send(&mut engine, alice, "JOIN #chan\r\n");
    drain(&mut arx);
    send(&mut engine, bob, "JOIN #chan\r\n");
    drain(&mut arx);
    drain(&mut brx);

    send(&mut engine, alice, "PRIVMSG #chan :one\r\n");
    send(&mut engine, alice, "PRIVMSG #chan :two\r\n");
    send(&mut engine, alice, "PRIVMSG #chan :three\r\n");

    assert_eq!(
        drain(&mut brx),
        ":alice PRIVMSG #chan :one\r\n:alice PRIVMSG #chan :two\r\n:alice PRIVMSG #chan :three\r\n"
    );
}

// --- Error replies -------------------------------------------------------

#[test]
fn unregistered_connection_is_gated() {
    let mut engine = new_engine();
    let (id, mut rx) = connect(&mut engine);

    send(&mut engine, id, "JOIN #chan\r\n");
    assert_eq!(drain(&mut rx), ":server 451 * :You have not registered\r\n");
}

#[test]
fn ping_is_allowed_before_registration() {
    let mut engine = new_engine();
    let (id, mut rx) = connect(&mut engine);

    send(&mut engine, id, "PING :hello\r\n");
    assert_eq!(drain(&mut rx), ":server PONG server :hello\r\n");
}

#[test]
fn privmsg_to_unknown_nick() {
    let mut engine = new_engine();
    let (alice, mut rx) = register(&mut engine, "alice");

    send(&mut engine, alice, "PRIVMSG ghost :hi\r\n");
    assert_eq!(drain(&mut rx), ":server 401 alice ghost :No such nick/channel\r\n");
}

#[test]
fn privmsg_to_channel_not_a_member_of() {
    let mut engine = new_engine();
    let (alice, mut rx) = register(&mut engine, "alice");
    let (bob, mut brx) = register(&mut engine, "bob");
    send(&mut engine, bob, "JOIN #chan\r\n");
    drain(&mut brx);

    send(&mut engine, alice, "PRIVMSG #chan :hi\r\n");
    assert_eq!(drain(&mut rx), ":server 404 alice #chan :Cannot send to channel\r\n");
}

#[test]
fn join_rejects_malformed_room_name_and_continues_with_others() {
    let mut engine = new_engine();
    let (alice, mut rx) = register(&mut engine, "alice");

    send(&mut engine, alice, "JOIN not-a-channel,#chan\r\n");

    assert_eq!(
        drain(&mut rx),
        ":server 403 alice not-a-channel :No such channel\r\n\
         :alice JOIN :#chan\r\n:server 353 alice = #chan :alice\r\n\
         :server 366 alice #chan :End of /NAMES list.\r\n"
    );
}

#[test]
fn part_without_membership_is_rejected() {
    let mut engine = new_engine();
    let (alice, mut rx) = register(&mut engine, "alice");

    send(&mut engine, alice, "PART #chan\r\n");
    assert_eq!(drain(&mut rx), ":server 442 alice #chan :You're not on that channel\r\n");
}

#[test]
fn unknown_command_from_registered_connection() {
    let mut engine = new_engine();
    let (alice, mut rx) = register(&mut engine, "alice");

    send(&mut engine, alice, "FOOBAR baz\r\n");
    assert_eq!(drain(&mut rx), ":server 421 FOOBAR :Unknown command\r\n");
}

#[test]
fn unknown_command_from_unregistered_connection_is_silent() {
    let mut engine = new_engine();
    let (id, mut rx) = connect(&mut engine);

    send(&mut engine, id, "FOOBAR baz\r\n");
    assert_eq!(drain(&mut rx), "");
}
