use std::time::Duration;

use market_chat::common::{CallKind, CallStatus, ChatEvent, MessageKind};
use market_chat::config::ChatTimings;
use market_chat::engine::{ChatState, EngineHandles, spawn_engine};
use market_chat::storage::SeedData;
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout};

const VIEWER: &str = "current-user";

fn start(rng_seed: u64) -> EngineHandles {
    let state = ChatState::new(
        SeedData::mock(),
        VIEWER,
        ChatTimings::default(),
        StdRng::seed_from_u64(rng_seed),
    )
    .expect("mock seed is valid");
    spawn_engine(state, 64)
}

async fn next(events: &mut mpsc::Receiver<ChatEvent>) -> ChatEvent {
    timeout(Duration::from_secs(30), events.recv())
        .await
        .expect("engine went quiet")
        .expect("engine stopped")
}

/// Skips events until `pick` matches one.
async fn wait_for<T>(
    events: &mut mpsc::Receiver<ChatEvent>,
    mut pick: impl FnMut(&ChatEvent) -> Option<T>,
) -> T {
    loop {
        let event = next(events).await;
        if let Some(found) = pick(&event) {
            return found;
        }
    }
}

/// Paused-clock timers fire on millisecond ticks.
fn assert_close(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(10),
        "expected about {expected:?}, got {actual:?}"
    );
}

fn drain(events: &mut mpsc::Receiver<ChatEvent>) -> Vec<ChatEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

#[tokio::test(start_paused = true)]
async fn engine_starts_with_snapshot() {
    let mut engine = start(1);
    match next(&mut engine.events).await {
        ChatEvent::Ready(snapshot) => {
            assert_eq!(snapshot.viewer.id, VIEWER);
            assert_eq!(snapshot.chats.len(), 3);
            assert_eq!(snapshot.total_unread(), 1);
            assert_eq!(snapshot.messages["chat-2"].len(), 4);
            assert!(snapshot.active_call.is_none());
        }
        other => panic!("expected Ready, got {other:?}"),
    }
    engine.handle.shutdown().await.expect("shutdown");
}

#[tokio::test(start_paused = true)]
async fn sent_message_gets_a_reply_within_window() {
    let mut engine = start(2);
    next(&mut engine.events).await;

    let sent_at = Instant::now();
    engine
        .handle
        .send_message("chat-2", "test")
        .await
        .expect("send");

    let message = wait_for(&mut engine.events, |event| match event {
        ChatEvent::MessageAppended(message) => Some(message.clone()),
        _ => None,
    })
    .await;
    assert_eq!(message.content, "test");
    assert_eq!(message.sender_id, VIEWER);
    assert_eq!(message.kind, MessageKind::Text);
    assert!(message.is_read_by(VIEWER));

    let chat = wait_for(&mut engine.events, |event| match event {
        ChatEvent::ChatUpdated(chat) => Some(chat.clone()),
        _ => None,
    })
    .await;
    assert_eq!(
        chat.last_message.as_ref().map(|m| m.content.as_str()),
        Some("test")
    );
    assert_eq!(chat.unread_count, 0);

    let reply = wait_for(&mut engine.events, |event| match event {
        ChatEvent::MessageAppended(message) => Some(message.clone()),
        _ => None,
    })
    .await;
    let waited = sent_at.elapsed();
    assert!(waited >= Duration::from_secs(2), "reply after {waited:?}");
    assert!(waited <= Duration::from_secs(5), "reply after {waited:?}");
    assert_eq!(reply.sender_id, "user-2");
    assert!(!reply.is_read_by(VIEWER));

    let chat = wait_for(&mut engine.events, |event| match event {
        ChatEvent::ChatUpdated(chat) => Some(chat.clone()),
        _ => None,
    })
    .await;
    assert_eq!(chat.unread_count, 1);
    assert_eq!(chat.last_message.map(|m| m.id), Some(reply.id.clone()));

    let notification = wait_for(&mut engine.events, |event| match event {
        ChatEvent::Notification(notification) => Some(notification.clone()),
        _ => None,
    })
    .await;
    assert_eq!(notification.title, "New message from Mike Chen");
    assert_eq!(notification.description, reply.content);

    engine.handle.shutdown().await.expect("shutdown");
}

#[tokio::test(start_paused = true)]
async fn call_rings_connects_and_clears() {
    let mut engine = start(3);
    next(&mut engine.events).await;

    engine
        .handle
        .start_call("chat-1", CallKind::Voice)
        .await
        .expect("start call");
    let ringing_at = Instant::now();
    let call = wait_for(&mut engine.events, |event| match event {
        ChatEvent::CallChanged(call) => call.clone(),
        _ => None,
    })
    .await;
    assert_eq!(call.status, CallStatus::Ringing);
    assert_eq!(call.chat_id, "chat-1");
    assert_eq!(call.kind, CallKind::Voice);

    let connected = wait_for(&mut engine.events, |event| match event {
        ChatEvent::CallChanged(call) => call.clone(),
        _ => None,
    })
    .await;
    assert_close(ringing_at.elapsed(), Duration::from_secs(3));
    assert_eq!(connected.id, call.id);
    assert_eq!(connected.status, CallStatus::Connected);
    assert!(connected.start_time.is_some());

    engine.handle.end_call().await.expect("end call");
    let ended_at = Instant::now();
    let ended = wait_for(&mut engine.events, |event| match event {
        ChatEvent::CallChanged(call) => call.clone(),
        _ => None,
    })
    .await;
    assert_eq!(ended.status, CallStatus::Ended);
    assert!(ended.end_time.is_some());

    let cleared = wait_for(&mut engine.events, |event| match event {
        ChatEvent::CallChanged(call) => Some(call.is_none()),
        _ => None,
    })
    .await;
    assert!(cleared);
    assert_close(ended_at.elapsed(), Duration::from_secs(1));

    engine.handle.shutdown().await.expect("shutdown");
}

#[tokio::test(start_paused = true)]
async fn hanging_up_while_ringing_never_connects() {
    let mut engine = start(4);
    next(&mut engine.events).await;

    engine
        .handle
        .start_call("chat-3", CallKind::Video)
        .await
        .expect("start call");
    engine.handle.end_call().await.expect("end call");

    tokio::time::sleep(Duration::from_secs(5)).await;
    let statuses: Vec<Option<CallStatus>> = drain(&mut engine.events)
        .into_iter()
        .filter_map(|event| match event {
            ChatEvent::CallChanged(call) => Some(call.map(|c| c.status)),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![Some(CallStatus::Ringing), Some(CallStatus::Ended), None]
    );

    engine.handle.shutdown().await.expect("shutdown");
}

#[tokio::test(start_paused = true)]
async fn typing_indicator_expires_unless_refreshed() {
    let mut engine = start(5);
    next(&mut engine.events).await;

    engine
        .handle
        .set_typing("chat-1", true)
        .await
        .expect("typing");
    tokio::time::sleep(Duration::from_secs(2)).await;
    engine
        .handle
        .set_typing("chat-1", true)
        .await
        .expect("refresh");

    // First deadline passes; the refreshed indicator survives it.
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let changes: Vec<usize> = drain(&mut engine.events)
        .into_iter()
        .filter_map(|event| match event {
            ChatEvent::TypingChanged(typing) => Some(typing.len()),
            _ => None,
        })
        .collect();
    assert_eq!(changes, vec![1, 1]);

    tokio::time::sleep(Duration::from_secs(2)).await;
    let changes: Vec<usize> = drain(&mut engine.events)
        .into_iter()
        .filter_map(|event| match event {
            ChatEvent::TypingChanged(typing) => Some(typing.len()),
            _ => None,
        })
        .collect();
    assert_eq!(changes, vec![0]);

    engine.handle.shutdown().await.expect("shutdown");
}

#[tokio::test(start_paused = true)]
async fn blocked_chat_gets_no_reply() {
    let mut engine = start(6);
    next(&mut engine.events).await;

    engine.handle.block_user("chat-2").await.expect("block");
    engine
        .handle
        .send_message("chat-2", "anyone there?")
        .await
        .expect("send");

    tokio::time::sleep(Duration::from_secs(6)).await;
    let events = drain(&mut engine.events);
    let from_seller = events.iter().any(|event| {
        matches!(event, ChatEvent::MessageAppended(message) if message.sender_id == "user-2")
    });
    assert!(!from_seller);
    assert!(events.iter().any(|event| {
        matches!(event, ChatEvent::ChatUpdated(chat) if chat.id == "chat-2" && chat.is_blocked)
    }));

    engine.handle.shutdown().await.expect("shutdown");
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_replies() {
    let mut engine = start(7);
    next(&mut engine.events).await;

    engine
        .handle
        .send_message("chat-1", "still there?")
        .await
        .expect("send");
    engine.handle.shutdown().await.expect("shutdown");
    engine.task.await.expect("engine task");

    tokio::time::sleep(Duration::from_secs(10)).await;
    let mut appended = 0;
    while let Some(event) = engine.events.recv().await {
        if let ChatEvent::MessageAppended(message) = event {
            assert_eq!(message.sender_id, VIEWER);
            appended += 1;
        }
    }
    assert_eq!(appended, 1);

    let closed = engine.handle.send_message("chat-1", "hello?").await;
    assert!(closed.is_err());
}

#[tokio::test(start_paused = true)]
async fn rejected_operations_leave_state_untouched() {
    let mut engine = start(8);
    next(&mut engine.events).await;

    engine
        .handle
        .send_message("chat-404", "hello")
        .await
        .expect("dispatch");
    engine
        .handle
        .mark_as_read("chat-1", "msg-missing")
        .await
        .expect("dispatch");
    engine.handle.end_call().await.expect("dispatch");

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(drain(&mut engine.events).is_empty());

    engine.handle.shutdown().await.expect("shutdown");
}
