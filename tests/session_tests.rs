//! Whole-session tests over the in-memory transport.
//! Input is fed as bytes, the way piped standard input would arrive.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chatline::chat::{ChatSession, Console, InboundEvent, ReaderSource, spawn_poller};
    use chatline::{
        Channel, Community, DirectMessageChannel, Member, MemoryTransport, User,
    };
    use tokio::sync::mpsc;

    fn plan9(members: Vec<Member>, dms: Vec<DirectMessageChannel>) -> Arc<MemoryTransport> {
        let mut transport = MemoryTransport::new(User::new("1", "me"))
            .with_community(
                Community::new("10", "plan9"),
                vec![
                    Channel::community("100", "general"),
                    Channel::community("101", "acme"),
                ],
            )
            .with_members("10", members);
        for dm in dms {
            transport = transport.with_direct_message(dm);
        }
        Arc::new(transport)
    }

    /// Selects plan9/#general, then runs `lines` through the loop.
    async fn chat(
        transport: &Arc<MemoryTransport>,
        lines: &str,
    ) -> (ChatSession<MemoryTransport>, String) {
        let (console, buffer) = Console::capture(false);
        let mut session = ChatSession::new(transport.clone(), console);
        let script = format!("1\n1\n{lines}");
        let mut input = ReaderSource::new(script.as_bytes());
        session.start(&mut input).await.unwrap();
        session.run(&mut input).await.unwrap();
        (session, buffer.contents())
    }

    fn sent_texts(transport: &MemoryTransport) -> Vec<String> {
        transport.sent().into_iter().map(|(_, text)| text).collect()
    }

    #[tokio::test]
    async fn fenced_block_is_sent_verbatim() {
        let transport = plan9(vec![Member::new(User::new("2", "bob"))], vec![]);
        chat(&transport, "```\nhello @bob\n```\n").await;
        assert_eq!(
            transport.sent(),
            vec![("100".to_string(), "```\nhello @bob\n```\n".to_string())]
        );
        assert_eq!(transport.member_lookups(), 0);
    }

    #[tokio::test]
    async fn invalid_utf8_line_is_sent_and_session_continues() {
        let transport = plan9(vec![], vec![]);
        let (console, _) = Console::capture(false);
        let mut session = ChatSession::new(transport.clone(), console);
        let mut input = ReaderSource::new(
            &b"1\n1\nbefore\ncaf\xe9\n```\nbytes \xff here\n```\nafter\n"[..],
        );
        session.start(&mut input).await.unwrap();
        session.run(&mut input).await.unwrap();
        assert_eq!(
            sent_texts(&transport),
            vec![
                "before",
                "caf\u{fffd}",
                "```\nbytes \u{fffd} here\n```\n",
                "after"
            ]
        );
    }

    #[tokio::test]
    async fn empty_line_ends_session() {
        let transport = plan9(vec![], vec![]);
        chat(&transport, "\nnever sent\n").await;
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn quit_command_ends_session() {
        let transport = plan9(vec![], vec![]);
        chat(&transport, ":q\nnever sent\n").await;
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn quit_only_matches_exactly() {
        let transport = plan9(vec![], vec![]);
        chat(&transport, " :q\n:quit\n").await;
        assert_eq!(sent_texts(&transport), vec![" :q", ":quit"]);
    }

    #[tokio::test]
    async fn every_line_is_dispatched_once() {
        let transport = plan9(vec![], vec![]);
        let (session, _) = chat(&transport, "hello\nworld").await;
        assert_eq!(sent_texts(&transport), vec!["hello", "world"]);
        assert_eq!(session.stats().messages_sent, 2);
    }

    #[tokio::test]
    async fn nickname_wins_over_later_username() {
        let transport = plan9(
            vec![
                Member::with_nick(User::new("2", "robert"), "bob"),
                Member::new(User::new("3", "bob2")),
            ],
            vec![],
        );
        chat(&transport, "hi @bob\n").await;
        assert_eq!(sent_texts(&transport), vec!["hi <@2>"]);
    }

    #[tokio::test]
    async fn unresolved_mention_is_unchanged() {
        let transport = plan9(vec![Member::new(User::new("2", "bob"))], vec![]);
        chat(&transport, "ping @zzzzz_nonexistent!\n").await;
        assert_eq!(sent_texts(&transport), vec!["ping @zzzzz_nonexistent!"]);
    }

    #[tokio::test]
    async fn prefix_resolves_community_member() {
        let transport = plan9(vec![Member::new(User::new("4", "alice"))], vec![]);
        chat(&transport, "@ali: lunch?\n").await;
        assert_eq!(sent_texts(&transport), vec!["<@4>: lunch?"]);
    }

    #[tokio::test]
    async fn prefix_falls_back_to_direct_messages() {
        let transport = plan9(
            vec![],
            vec![DirectMessageChannel::new("900", vec![User::new("5", "alicia")])],
        );
        chat(&transport, "@ali\n").await;
        assert_eq!(sent_texts(&transport), vec!["<@5>"]);
        assert_eq!(transport.direct_message_lookups(), 1);
    }

    #[tokio::test]
    async fn each_mention_does_its_own_lookup() {
        let transport = plan9(vec![Member::new(User::new("4", "alice"))], vec![]);
        chat(&transport, "@ali and @ali\n").await;
        assert_eq!(sent_texts(&transport), vec!["<@4> and <@4>"]);
        assert_eq!(transport.member_lookups(), 2);
    }

    #[tokio::test]
    async fn failed_member_lookup_leaves_token() {
        let transport = plan9(vec![Member::new(User::new("4", "alice"))], vec![]);
        transport.fail_member_lookups(true);
        let (_, output) = chat(&transport, "hey @ali\n").await;
        assert_eq!(sent_texts(&transport), vec!["hey @ali"]);
        assert!(output.contains("Could not look up members"));
    }

    #[tokio::test]
    async fn out_of_range_choice_reprompts() {
        let transport = plan9(vec![], vec![]);
        let (console, buffer) = Console::capture(false);
        let mut session = ChatSession::new(transport.clone(), console);
        let mut input = ReaderSource::new("7\n0\n1\n3\n2\nhi\n".as_bytes());
        session.start(&mut input).await.unwrap();
        session.run(&mut input).await.unwrap();
        let output = buffer.contents();
        assert!(output.contains("'7' is not a choice between 1 and 1"));
        assert!(output.contains("'0' is not a choice between 1 and 1"));
        assert!(output.contains("'3' is not a choice between 1 and 2"));
        assert_eq!(
            transport.sent(),
            vec![("101".to_string(), "hi".to_string())]
        );
    }

    #[tokio::test]
    async fn send_failures_do_not_stop_the_loop() {
        let transport = plan9(vec![], vec![]);
        transport.fail_sends(true);
        let (session, output) = chat(&transport, "one\ntwo\n").await;
        assert_eq!(session.stats().send_failures, 2);
        assert_eq!(output.matches("Error: Permission error").count(), 2);
    }

    #[tokio::test]
    async fn action_message_resolves_mentions() {
        let transport = plan9(vec![Member::new(User::new("4", "alice"))], vec![]);
        chat(&transport, ":me waves at @ali\n").await;
        assert_eq!(sent_texts(&transport), vec!["_waves at <@4>_"]);
    }

    #[tokio::test]
    async fn escaped_colon_and_unknown_commands_are_text() {
        let transport = plan9(vec![], vec![]);
        chat(&transport, "::q\n:D\n").await;
        assert_eq!(sent_texts(&transport), vec![":q", ":D"]);
    }

    #[tokio::test]
    async fn local_commands_send_nothing() {
        let transport = plan9(vec![], vec![]);
        let (_, output) = chat(&transport, ":h\n:s\n:me\n").await;
        assert!(transport.sent().is_empty());
        assert!(output.contains("Available commands:"));
        assert!(output.contains("Talking in #general on plan9"));
    }

    #[tokio::test]
    async fn private_conversation_uses_direct_message_lookup_only() {
        let transport = plan9(
            vec![Member::new(User::new("4", "alice"))],
            vec![DirectMessageChannel::new("900", vec![User::new("5", "alicia")])],
        );
        chat(&transport, ":p\n1\nhi @ali\n").await;
        assert_eq!(
            transport.sent(),
            vec![("900".to_string(), "hi <@5>".to_string())]
        );
        assert_eq!(transport.member_lookups(), 0);
    }

    #[tokio::test]
    async fn no_communities_is_an_initialization_error() {
        let transport = Arc::new(MemoryTransport::new(User::new("1", "me")));
        let (console, _) = Console::capture(false);
        let mut session = ChatSession::new(transport, console);
        let mut input = ReaderSource::new("1\n".as_bytes());
        let err = session.start(&mut input).await.unwrap_err();
        assert!(err.is_initialization());
    }

    #[tokio::test(start_paused = true)]
    async fn inbound_follows_selected_channel() {
        let transport = plan9(vec![], vec![]);
        transport.post("100", User::new("2", "bob"), "welcome");
        let (console, _) = Console::capture(false);
        let mut session = ChatSession::new(transport.clone(), console);
        let (events_tx, mut events_rx) = mpsc::channel(16);
        let poller = spawn_poller(
            transport.clone(),
            session.subscribe(),
            5,
            Duration::from_millis(200),
            events_tx,
        );

        let mut input = ReaderSource::new("1\n1\nhello\n".as_bytes());
        session.start(&mut input).await.unwrap();
        let event = events_rx.recv().await.unwrap();
        assert!(matches!(event, InboundEvent::Backlog(m) if m.content == "welcome"));

        session.run(&mut input).await.unwrap();
        let event = events_rx.recv().await.unwrap();
        assert!(matches!(&event, InboundEvent::Message(m) if m.content == "hello"));
        assert_eq!(event.message().author.id, "1");
        poller.abort();
    }
}
