use crate::*;

use relay_core::SERVER_NAME;

/// Plain text reaches every registered session, the sender included.
#[tokio::test]
async fn test_broadcast_echoes_to_everyone() -> Result<()> {
    let relay = Relay::start().await?;
    let mut alice = Client::login(relay.addr, "alice").await?;
    let mut bob = Client::login(relay.addr, "bob").await?;
    alice.expect(&notice::joined("bob")).await?;

    alice.say("alice", "hello").await?;
    let expected = Message::broadcast("alice", "hello");
    alice.expect(&expected).await?;
    bob.expect(&expected).await?;

    relay.stop().await
}

/// alice → bob via /privado: both get the same envelope, carol gets nothing.
#[tokio::test]
async fn test_directed_message_reaches_exactly_two() -> Result<()> {
    let relay = Relay::start().await?;
    let mut alice = Client::login(relay.addr, "alice").await?;
    let mut bob = Client::login(relay.addr, "bob").await?;
    alice.expect(&notice::joined("bob")).await?;
    let mut carol = Client::login(relay.addr, "carol").await?;
    alice.expect(&notice::joined("carol")).await?;
    bob.expect(&notice::joined("carol")).await?;

    alice.say("alice", "/privado:bob:hi").await?;
    let expected = Message::directed("alice", "bob", "hi");
    bob.expect(&expected).await?;
    alice.expect(&expected).await?;
    carol.expect_silence().await?;

    relay.stop().await
}

#[tokio::test]
async fn test_directed_message_to_unknown_user() -> Result<()> {
    let relay = Relay::start().await?;
    let mut alice = Client::login(relay.addr, "alice").await?;
    let mut bob = Client::login(relay.addr, "bob").await?;
    alice.expect(&notice::joined("bob")).await?;

    alice.say("alice", "/privado:ghost:boo").await?;
    let reply = alice.recv().await?;
    assert_eq!(reply.sender(), SERVER_NAME);
    assert_eq!(reply.recipient(), Some("alice"));
    assert_eq!(reply.body(), "User ghost not found.");
    bob.expect_silence().await?;

    relay.stop().await
}

#[tokio::test]
async fn test_malformed_directed_message() -> Result<()> {
    let relay = Relay::start().await?;
    let mut alice = Client::login(relay.addr, "alice").await?;
    let mut bob = Client::login(relay.addr, "bob").await?;
    alice.expect(&notice::joined("bob")).await?;

    alice.say("alice", "/privado:onlyonepart").await?;
    alice.expect(&notice::malformed_directed("alice")).await?;
    alice.expect_silence().await?;
    bob.expect_silence().await?;

    relay.stop().await
}

/// The roster is the same from any session and goes to the requester only.
#[tokio::test]
async fn test_roster_from_any_session() -> Result<()> {
    let relay = Relay::start().await?;
    let mut alice = Client::login(relay.addr, "alice").await?;
    let mut bob = Client::login(relay.addr, "bob").await?;
    alice.expect(&notice::joined("bob")).await?;

    alice.say("alice", "/usuarios").await?;
    alice.expect(&notice::roster("alice", &["alice", "bob"])).await?;
    bob.expect_silence().await?;

    bob.say("bob", "/usuarios").await?;
    bob.expect(&notice::roster("bob", &["alice", "bob"])).await?;
    alice.expect_silence().await?;

    relay.stop().await
}

/// Messages from one client arrive at another in the order they were sent.
#[tokio::test]
async fn test_broadcast_preserves_per_sender_order() -> Result<()> {
    let relay = Relay::start().await?;
    let mut alice = Client::login(relay.addr, "alice").await?;
    let mut bob = Client::login(relay.addr, "bob").await?;
    alice.expect(&notice::joined("bob")).await?;

    for i in 0..50 {
        alice.say("alice", &format!("msg {i}")).await?;
    }
    for i in 0..50 {
        assert_eq!(bob.recv().await?.body(), format!("msg {i}"));
    }

    relay.stop().await
}
