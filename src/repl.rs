//! Line-oriented front end over the chat engine, for terminals and scripted runs.

use std::collections::VecDeque;

use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::common::types::{CallKind, ChatTheme, MessageKind};
use crate::common::{ChatCommand, ChatEvent, ChatId};
use crate::engine::EngineHandles;
use crate::error::{ChatError, Result};
use crate::storage::catalog;
use crate::ui::format;
use crate::ui::state::AppState;

pub const HELP: &str = "\
commands:
  list [query]               list chats, optionally filtered
  show <chat>                print a conversation and mark it read
  send <chat> <text>         send a message
  meet <chat> <location>     suggest a meeting location
  read <chat> [message]      mark one message or the whole chat read
  call <chat> voice|video    start a call
  hangup                     end the active call
  typing <chat> on|off       toggle the typing indicator
  block <chat>               block the other participant
  report <chat> <reason>     report the other participant
  theme <chat> <theme>       default, blue, green or purple
  help                       show this text
  quit                       stop the engine and exit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplAction {
    List(Option<String>),
    Show(ChatId),
    Command(ChatCommand),
    Help,
    Quit,
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn required<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    if value.is_empty() {
        Err(ChatError::InvalidInput(format!("missing {what}")))
    } else {
        Ok(value)
    }
}

/// Parses a line; blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ReplAction>> {
    let (verb, rest) = split_word(line);
    if verb.is_empty() {
        return Ok(None);
    }

    let action = match verb.to_ascii_lowercase().as_str() {
        "list" | "ls" => ReplAction::List((!rest.is_empty()).then(|| rest.to_string())),
        "show" | "open" => ReplAction::Show(required(rest, "chat id")?.to_string()),
        "send" => {
            let (chat_id, text) = split_word(rest);
            ReplAction::Command(ChatCommand::SendMessage {
                chat_id: required(chat_id, "chat id")?.to_string(),
                content: required(text, "message text")?.to_string(),
                kind: MessageKind::Text,
            })
        }
        "meet" => {
            let (chat_id, location) = split_word(rest);
            ReplAction::Command(ChatCommand::SendMessage {
                chat_id: required(chat_id, "chat id")?.to_string(),
                content: catalog::meeting_suggestion(required(location, "location")?),
                kind: MessageKind::Text,
            })
        }
        "read" => {
            let (chat_id, message_id) = split_word(rest);
            let chat_id = required(chat_id, "chat id")?.to_string();
            if message_id.is_empty() {
                ReplAction::Command(ChatCommand::MarkChatRead { chat_id })
            } else {
                ReplAction::Command(ChatCommand::MarkAsRead {
                    chat_id,
                    message_id: message_id.to_string(),
                })
            }
        }
        "call" => {
            let (chat_id, kind) = split_word(rest);
            ReplAction::Command(ChatCommand::StartCall {
                chat_id: required(chat_id, "chat id")?.to_string(),
                kind: required(kind, "call type")?.parse::<CallKind>()?,
            })
        }
        "hangup" | "end" => ReplAction::Command(ChatCommand::EndCall),
        "typing" => {
            let (chat_id, flag) = split_word(rest);
            let is_typing = match flag.to_ascii_lowercase().as_str() {
                "on" | "true" | "" => true,
                "off" | "false" => false,
                other => {
                    return Err(ChatError::InvalidInput(format!(
                        "expected on or off, got `{other}`"
                    )));
                }
            };
            ReplAction::Command(ChatCommand::SetTyping {
                chat_id: required(chat_id, "chat id")?.to_string(),
                is_typing,
            })
        }
        "block" => ReplAction::Command(ChatCommand::BlockUser {
            chat_id: required(rest, "chat id")?.to_string(),
        }),
        "report" => {
            let (chat_id, reason) = split_word(rest);
            ReplAction::Command(ChatCommand::ReportUser {
                chat_id: required(chat_id, "chat id")?.to_string(),
                reason: required(reason, "reason")?.to_string(),
            })
        }
        "theme" => {
            let (chat_id, theme) = split_word(rest);
            ReplAction::Command(ChatCommand::UpdateChatTheme {
                chat_id: required(chat_id, "chat id")?.to_string(),
                theme: required(theme, "theme")?.parse::<ChatTheme>()?,
            })
        }
        "help" | "?" => ReplAction::Help,
        "quit" | "exit" => ReplAction::Quit,
        other => {
            return Err(ChatError::InvalidInput(format!("unknown command `{other}`")));
        }
    };
    Ok(Some(action))
}

/// One-line summary of an engine event, or `None` for events not worth printing.
pub fn describe_event(state: &AppState, event: &ChatEvent) -> Option<String> {
    match event {
        ChatEvent::Ready(snapshot) => Some(format!(
            "ready: {} chats, {} unread",
            snapshot.chats.len(),
            snapshot.total_unread()
        )),
        ChatEvent::MessageAppended(message) => {
            let sender = if message.sender_id == state.viewer_id() {
                "you".to_string()
            } else {
                state
                    .chat(&message.chat_id)
                    .and_then(|chat| chat.participants.iter().find(|u| u.id == message.sender_id))
                    .map(|user| user.name.clone())
                    .unwrap_or_else(|| message.sender_id.clone())
            };
            Some(format!(
                "[{}] {} {}: {}",
                message.chat_id,
                format::clock_time(message.timestamp),
                sender,
                message.content
            ))
        }
        ChatEvent::MessageUpdated(_) => None,
        ChatEvent::ChatUpdated(chat) => {
            let previous = state.chat(&chat.id);
            if previous.is_some_and(|p| !p.is_blocked) && chat.is_blocked {
                Some(format!("[{}] blocked", chat.id))
            } else if previous.is_some_and(|p| p.theme != chat.theme) {
                Some(format!("[{}] theme: {}", chat.id, chat.theme.display_name()))
            } else {
                None
            }
        }
        ChatEvent::CallChanged(Some(call)) => Some(format!(
            "call {} ({}): {}",
            call.chat_id,
            call.kind.as_str(),
            format::call_status_text(call, Utc::now())
        )),
        ChatEvent::CallChanged(None) => Some("call closed".to_string()),
        ChatEvent::TypingChanged(typing) => {
            let others: Vec<&str> = typing
                .iter()
                .filter(|indicator| indicator.is_typing && indicator.user_id != state.viewer_id())
                .map(|indicator| indicator.chat_id.as_str())
                .collect();
            (!others.is_empty()).then(|| format!("typing in: {}", others.join(", ")))
        }
        ChatEvent::Notification(notification) => Some(format!(
            "* {}: {}",
            notification.title, notification.description
        )),
    }
}

pub fn render_list(state: &AppState, query: Option<&str>) -> String {
    let now = Utc::now();
    let viewer_id = state.viewer_id();
    let mut out = String::new();
    for chat in state
        .chats
        .iter()
        .filter(|chat| chat.matches_query(query.unwrap_or_default()))
    {
        let name = chat
            .counterpart(viewer_id)
            .map(|user| user.name.as_str())
            .unwrap_or("Unknown");
        let when = chat
            .last_message
            .as_ref()
            .map(|m| format::relative_time(m.timestamp, now))
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<8} {:<8} {:<36} unread {:<3} {}{}\n",
            chat.id,
            name,
            chat.listing.title,
            chat.unread_count,
            when,
            if chat.is_blocked { " [blocked]" } else { "" }
        ));
    }
    if out.is_empty() {
        out.push_str("No conversations found\n");
    }
    out
}

pub fn render_conversation(state: &AppState, chat_id: &str) -> Result<String> {
    let chat = state
        .chat(chat_id)
        .ok_or_else(|| ChatError::UnknownChat(chat_id.to_string()))?;
    let viewer_id = state.viewer_id();
    let mut out = format!(
        "{} · {} · {}\n",
        chat.listing.title,
        chat.listing.author,
        format::price_line(&chat.listing)
    );
    for message in state.chat_messages(chat_id) {
        let sender = chat
            .participants
            .iter()
            .find(|user| user.id == message.sender_id)
            .map(|user| user.name.as_str())
            .unwrap_or(&message.sender_id);
        out.push_str(&format!(
            "  {} {} {:<6} {}: {}\n",
            message.id,
            format::clock_time(message.timestamp),
            format::receipt(message, viewer_id).symbol(),
            sender,
            message.content
        ));
    }
    Ok(out)
}

/// Reads commands from stdin until `quit` or end of input, printing engine events as they arrive.
pub async fn run(handles: EngineHandles) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    run_script(handles, input, &mut stdout).await
}

/// Drives the engine from `input` and writes every event to `output`.
///
/// Input is read once the engine's snapshot has arrived. Commands wait in a
/// local queue until the engine has room for them, and no further input is
/// read while any are queued. Events are drained the whole time, so a busy
/// engine never stalls on a full event channel. After `quit` or end of input
/// the engine is shut down and every event it already produced is printed.
pub async fn run_script<R, W>(handles: EngineHandles, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let EngineHandles {
        handle,
        mut events,
        task,
    } = handles;
    let mut state = AppState::new();
    let mut lines = input.lines();
    let mut queued: VecDeque<ChatCommand> = VecDeque::new();
    let mut closing = false;

    output.write_all(b"type `help` for commands\n").await?;

    loop {
        tokio::select! {
            biased;
            event = events.recv() => {
                let Some(event) = event else { break };
                if let Some(line) = describe_event(&state, &event) {
                    output.write_all(format!("{line}\n").as_bytes()).await?;
                }
                state.apply_event(event);
            }
            permit = handle.reserve(), if !queued.is_empty() => match permit {
                Ok(permit) => {
                    if let Some(command) = queued.pop_front() {
                        permit.send(command);
                    }
                }
                Err(err) => {
                    log::warn!("Dropping {} queued commands: {err}", queued.len());
                    queued.clear();
                    closing = true;
                }
            },
            line = lines.next_line(), if state.is_ready() && queued.is_empty() && !closing => {
                let text = match line? {
                    Some(line) => match parse_line(&line) {
                        Ok(None) => String::new(),
                        Ok(Some(ReplAction::Quit)) => {
                            queued.push_back(ChatCommand::Shutdown);
                            closing = true;
                            String::new()
                        }
                        Ok(Some(ReplAction::Help)) => format!("{HELP}\n"),
                        Ok(Some(ReplAction::List(query))) => render_list(&state, query.as_deref()),
                        Ok(Some(ReplAction::Show(chat_id))) => {
                            match render_conversation(&state, &chat_id) {
                                Ok(text) => {
                                    queued.push_back(ChatCommand::MarkChatRead { chat_id });
                                    text
                                }
                                Err(err) => format!("error: {err}\n"),
                            }
                        }
                        Ok(Some(ReplAction::Command(command))) => {
                            queued.push_back(command);
                            String::new()
                        }
                        Err(err) => format!("error: {err}\n"),
                    },
                    None => {
                        queued.push_back(ChatCommand::Shutdown);
                        closing = true;
                        String::new()
                    }
                };
                output.write_all(text.as_bytes()).await?;
            }
        }
        output.flush().await?;
    }

    if let Err(err) = task.await {
        log::warn!("Chat engine task failed: {err}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChatTimings;
    use crate::engine::ChatState;
    use crate::storage::SeedData;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn parse(line: &str) -> ReplAction {
        parse_line(line).expect("parse").expect("action")
    }

    fn mirror() -> AppState {
        let engine = ChatState::new(
            SeedData::mock(),
            "current-user",
            ChatTimings::default(),
            StdRng::seed_from_u64(11),
        )
        .expect("state");
        let mut state = AppState::new();
        state.apply_event(ChatEvent::Ready(engine.snapshot()));
        state
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse_line("   ").expect("parse"), None);
    }

    #[test]
    fn send_keeps_the_whole_text() {
        assert_eq!(
            parse("send chat-2 is it still   available?"),
            ReplAction::Command(ChatCommand::SendMessage {
                chat_id: "chat-2".to_string(),
                content: "is it still   available?".to_string(),
                kind: MessageKind::Text,
            })
        );
    }

    #[test]
    fn meet_builds_a_suggestion() {
        assert_eq!(
            parse("meet chat-1 Central Library"),
            ReplAction::Command(ChatCommand::SendMessage {
                chat_id: "chat-1".to_string(),
                content: "How about we meet at Central Library?".to_string(),
                kind: MessageKind::Text,
            })
        );
    }

    #[test]
    fn read_with_and_without_message() {
        assert_eq!(
            parse("read chat-1"),
            ReplAction::Command(ChatCommand::MarkChatRead {
                chat_id: "chat-1".to_string()
            })
        );
        assert_eq!(
            parse("read chat-1 msg-3"),
            ReplAction::Command(ChatCommand::MarkAsRead {
                chat_id: "chat-1".to_string(),
                message_id: "msg-3".to_string(),
            })
        );
    }

    #[test]
    fn call_theme_and_typing_arguments_are_validated() {
        assert_eq!(
            parse("call chat-1 VIDEO"),
            ReplAction::Command(ChatCommand::StartCall {
                chat_id: "chat-1".to_string(),
                kind: CallKind::Video,
            })
        );
        assert!(parse_line("call chat-1 fax").is_err());
        assert!(parse_line("call chat-1").is_err());

        assert_eq!(
            parse("theme chat-3 purple"),
            ReplAction::Command(ChatCommand::UpdateChatTheme {
                chat_id: "chat-3".to_string(),
                theme: ChatTheme::Purple,
            })
        );
        assert!(parse_line("theme chat-3 neon").is_err());

        assert_eq!(
            parse("typing chat-2 off"),
            ReplAction::Command(ChatCommand::SetTyping {
                chat_id: "chat-2".to_string(),
                is_typing: false,
            })
        );
        assert!(parse_line("typing chat-2 maybe").is_err());
    }

    #[test]
    fn report_requires_a_reason() {
        assert!(parse_line("report chat-1").is_err());
        assert_eq!(
            parse("report chat-1 asked for payment upfront"),
            ReplAction::Command(ChatCommand::ReportUser {
                chat_id: "chat-1".to_string(),
                reason: "asked for payment upfront".to_string(),
            })
        );
    }

    #[test]
    fn misc_verbs() {
        assert_eq!(parse("list"), ReplAction::List(None));
        assert_eq!(parse("list dune"), ReplAction::List(Some("dune".to_string())));
        assert_eq!(parse("HANGUP"), ReplAction::Command(ChatCommand::EndCall));
        assert_eq!(parse("quit"), ReplAction::Quit);
        assert!(parse_line("dance").is_err());
    }

    #[test]
    fn list_filters_and_shows_unread() {
        let state = mirror();
        let all = render_list(&state, None);
        assert_eq!(all.lines().count(), 3);
        let filtered = render_list(&state, Some("mike"));
        assert_eq!(filtered.lines().count(), 1);
        assert!(filtered.starts_with("chat-2"));
        assert_eq!(render_list(&state, Some("zzz")), "No conversations found\n");
    }

    #[test]
    fn show_unknown_chat_is_an_error() {
        let state = mirror();
        assert!(render_conversation(&state, "chat-99").is_err());
        let text = render_conversation(&state, "chat-2").expect("chat-2");
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn notifications_are_described() {
        let state = mirror();
        let event = ChatEvent::Notification(crate::common::Notification::new(
            "Message blocked",
            "Mike",
        ));
        assert_eq!(
            describe_event(&state, &event),
            Some("* Message blocked: Mike".to_string())
        );
    }

    async fn run_lines(script: &str, buffer: usize) -> String {
        let engine = ChatState::new(
            SeedData::mock(),
            "current-user",
            ChatTimings::default(),
            StdRng::seed_from_u64(12),
        )
        .expect("state");
        let handles = crate::engine::spawn_engine(engine, buffer);
        let mut output = Vec::new();
        tokio::time::timeout(
            std::time::Duration::from_secs(60),
            run_script(handles, script.as_bytes(), &mut output),
        )
        .await
        .expect("script finished")
        .expect("script ran");
        String::from_utf8(output).expect("utf8 output")
    }

    #[tokio::test(start_paused = true)]
    async fn long_script_is_echoed_in_full() {
        let mut script: String = (0..500).map(|i| format!("send chat-1 hello {i}\n")).collect();
        script.push_str("quit\nsend chat-1 never sent\n");

        let output = run_lines(&script, 8).await;
        let echoed: Vec<&str> = output
            .lines()
            .filter(|line| line.starts_with("[chat-1]") && line.contains(" you: hello "))
            .collect();
        assert_eq!(echoed.len(), 500);
        assert!(echoed[0].ends_with("you: hello 0"));
        assert!(echoed[499].ends_with("you: hello 499"));
        assert!(!output.contains("never sent"));
    }

    #[tokio::test(start_paused = true)]
    async fn end_of_input_still_flushes_pending_events() {
        let script: String = (0..50).map(|i| format!("send chat-2 offer {i}\n")).collect();

        let output = run_lines(&script, 100).await;
        assert!(output.contains("ready: 3 chats, 1 unread"));
        let echoed = output
            .lines()
            .filter(|line| line.contains(" you: offer "))
            .count();
        assert_eq!(echoed, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn show_prints_history_and_reports_errors() {
        let output = run_lines("show chat-2\nshow chat-99\ndance\n", 8).await;
        assert!(output.contains("Great! When can we meet?"));
        assert!(output.contains("error: chat not found: chat-99"));
        assert!(output.contains("error: invalid input: unknown command `dance`"));
    }
}
