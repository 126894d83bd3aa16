use colored::Colorize;
use log::{ info, warn };
use std::error::Error;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader };
use tokio::sync::broadcast::{ self, error::{ RecvError, TryRecvError } };
use tokio::sync::{ oneshot, Mutex };
use tokio::task::{ JoinHandle, JoinSet };

use crate::config::SessionConfig;
use crate::models::chat::{ ChatMessage, Role };
use crate::session::conversation::ConversationEvent;
use crate::session::ticker::spawn_fun_facts;
use crate::session::transport::HttpRelayTransport;
use crate::session::{ ChatSession, SubmitOutcome };

const HELP: &str = "Commands: /reset clears the chat, /error shows the last error, /quit exits.";
const BUSY_NOTICE: &str = "Sending... wait for the reply first.";
const RESET_BANNER: &str = "— conversation reset —";

pub fn format_message(message: &ChatMessage) -> String {
    match message.role {
        Role::User => format!("{} {}", "you ›".green().bold(), message.content),
        Role::Assistant => format!("{} {}", "DeforestBot ›".cyan().bold(), message.content),
        Role::System => {
            format!("{} {}", format!("{} ›", message.role).dimmed(), message.content.dimmed())
        }
    }
}

async fn write_line<W>(out: &Mutex<W>, line: &str) -> io::Result<()>
    where W: AsyncWrite + Unpin
{
    let mut out = out.lock().await;
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

async fn render_event<W>(out: &Mutex<W>, event: ConversationEvent) -> io::Result<()>
    where W: AsyncWrite + Unpin
{
    match event {
        ConversationEvent::Appended { message, .. } => write_line(out, &format_message(&message)).await,
        ConversationEvent::Reset { message } => {
            write_line(out, &RESET_BANNER.dimmed().to_string()).await?;
            write_line(out, &format_message(&message)).await
        }
    }
}

/// Prints conversation events until `stop` fires, then prints whatever is
/// still queued so nothing appended before shutdown is lost.
fn spawn_renderer<W>(
    mut events: broadcast::Receiver<ConversationEvent>,
    out: Arc<Mutex<W>>,
    mut stop: oneshot::Receiver<()>
) -> JoinHandle<io::Result<()>>
    where W: AsyncWrite + Unpin + Send + 'static
{
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                received = events.recv() => match received {
                    Ok(event) => render_event(&out, event).await?,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Renderer fell behind, {} message(s) not shown", skipped);
                    }
                    Err(RecvError::Closed) => return Ok(()),
                },
                _ = &mut stop => break,
            }
        }

        loop {
            match events.try_recv() {
                Ok(event) => render_event(&out, event).await?,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Renderer fell behind, {} message(s) not shown", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        Ok(())
    })
}

/// Runs the chat loop over any line source and writer. Each input line is
/// one submission. On end of input every submission still in flight is
/// awaited and its reply rendered before returning; `/quit` abandons them.
pub async fn drive_chat<R, W>(
    session: Arc<ChatSession>,
    input: R,
    out: Arc<Mutex<W>>,
    fun_fact_interval: Duration
) -> Result<(), Box<dyn Error + Send + Sync>>
    where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin + Send + 'static
{
    let events = session.subscribe();
    write_line(&out, &HELP.dimmed().to_string()).await?;
    for message in session.messages() {
        write_line(&out, &format_message(&message)).await?;
    }

    let (stop_tx, stop_rx) = oneshot::channel();
    let renderer = spawn_renderer(events, out.clone(), stop_rx);
    let ticker = spawn_fun_facts(session.clone(), fun_fact_interval);
    let mut submissions = JoinSet::new();

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim().to_string();
        match command.as_str() {
            "/quit" | "/exit" => {
                submissions.abort_all();
                break;
            }
            "/reset" => session.reset(),
            "/error" => {
                let report = match session.last_error() {
                    Some(e) => format!("{} {}", "last error:".red(), e),
                    None => "no error recorded".dimmed().to_string(),
                };
                write_line(&out, &report).await?;
            }
            _ => {
                session.set_draft(&line);
                let session = session.clone();
                let out = out.clone();
                submissions.spawn(async move {
                    if session.submit(&line).await == SubmitOutcome::Busy {
                        if let Err(e) = write_line(&out, &BUSY_NOTICE.yellow().to_string()).await {
                            warn!("Failed to write busy notice: {}", e);
                        }
                    }
                });
            }
        }
    }

    while submissions.join_next().await.is_some() {}
    ticker.abort();
    let _ = ticker.await;

    let _ = stop_tx.send(());
    renderer.await??;
    Ok(())
}

/// Interactive chat against a running relay on stdin/stdout.
pub async fn run_chat(config: SessionConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let transport = Arc::new(HttpRelayTransport::new(&config.relay_url, config.request_timeout)?);
    info!("Chatting through {}", transport.endpoint());
    let session = Arc::new(ChatSession::new(transport, config.model.clone()));

    let stdout = Arc::new(Mutex::new(tokio::io::stdout()));
    drive_chat(session, BufReader::new(tokio::io::stdin()), stdout, config.fun_fact_interval).await
}
