//! The two-node conversation turn: `get_context`, then `supervisor` once the context is
//! complete.

use crate::checkpoint::{Checkpoint, Checkpointer};
use crate::dispatch::{Dispatch, Dispatcher};
use crate::error::{GraphError, Result};
use crate::extract::ContextExtractor;
use crate::gate::{CompletionGate, GateDecision};
use crate::reducer::{append_messages, merge_messages};
use crate::stream::StreamEvent;
use brief_core::{ConversationState, Message, session_key};
use brief_telemetry::Instrument;
use futures::stream::{Stream, StreamExt};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

pub const GET_CONTEXT: &str = "get_context";
pub const SUPERVISOR: &str = "supervisor";

pub type WorkflowStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

type SessionLocks = HashMap<String, Arc<tokio::sync::Mutex<()>>>;

/// Runs conversation turns and persists their state.
///
/// Every turn appends the user's message, recovers the report context and either asks
/// one clarifying question or hands the conversation to the report pipeline. Each node
/// commits its result with a checkpoint when it completes; a node that fails commits
/// nothing. Turns of the same session run one at a time.
pub struct ContextWorkflow {
    extractor: ContextExtractor,
    gate: CompletionGate,
    dispatcher: Dispatcher,
    checkpointer: Arc<dyn Checkpointer>,
    sessions: Mutex<SessionLocks>,
}

impl ContextWorkflow {
    pub fn new(
        extractor: ContextExtractor,
        dispatcher: Dispatcher,
        checkpointer: Arc<dyn Checkpointer>,
    ) -> Self {
        Self {
            extractor,
            gate: CompletionGate::default(),
            dispatcher,
            checkpointer,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_gate(mut self, gate: CompletionGate) -> Self {
        self.gate = gate;
        self
    }

    /// Last committed state of a user's conversation.
    pub async fn state(&self, user_id: &str) -> Result<Option<ConversationState>> {
        Ok(self.checkpointer.load(&session_key(user_id)).await?.map(|c| c.state))
    }

    pub async fn reset(&self, user_id: &str) -> Result<()> {
        let thread_id = session_key(user_id);
        self.checkpointer.delete(&thread_id).await?;
        let mut sessions = self.sessions();
        if sessions.get(&thread_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            sessions.remove(&thread_id);
        }
        Ok(())
    }

    /// Sessions with a turn running or waiting.
    pub fn active_sessions(&self) -> usize {
        self.sessions().len()
    }

    fn sessions(&self) -> MutexGuard<'_, SessionLocks> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits until no other turn of `thread_id` is running.
    async fn begin_turn(self: &Arc<Self>, thread_id: &str) -> SessionTurn {
        let lock = {
            let mut sessions = self.sessions();
            // Entries left behind by turns dropped while waiting.
            sessions.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(sessions.entry(thread_id.to_string()).or_default())
        };
        let guard = Arc::clone(&lock).lock_owned().await;
        SessionTurn { workflow: Arc::clone(self), thread_id: thread_id.to_string(), lock, _guard: guard }
    }

    async fn load_state(&self, user_id: &str, thread_id: &str) -> Result<ConversationState> {
        match self.checkpointer.load(thread_id).await? {
            Some(checkpoint) => {
                checkpoint.state.observe_sequences();
                tracing::debug!(
                    thread_id,
                    messages = checkpoint.state.messages.len(),
                    last_node = %checkpoint.node,
                    "restored conversation"
                );
                Ok(checkpoint.state)
            }
            None => Ok(ConversationState::new(user_id)),
        }
    }

    async fn commit(
        &self,
        thread_id: &str,
        state: &ConversationState,
        step: usize,
        node: &str,
    ) -> Result<()> {
        let checkpoint = Checkpoint::new(thread_id, state.clone(), step, node);
        self.checkpointer.save(&checkpoint).await?;
        Ok(())
    }

    /// Runs one turn and streams what happens.
    ///
    /// The stream is lazy and ends after `Done` or after the first error.
    pub fn run_turn(self: Arc<Self>, user_id: &str, input: &str) -> WorkflowStream {
        let user_id = user_id.to_string();
        let input = input.to_string();
        let thread_id = session_key(&user_id);
        let this = self;

        let stream = async_stream::stream! {
            let _turn = this.begin_turn(&thread_id).await;

            tracing::info!(thread_id = %thread_id, "turn started");
            let mut state = match this.load_state(&user_id, &thread_id).await {
                Ok(state) => state,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            append_messages(&mut state.messages, [Message::human(input)]);

            let mut step = 0;
            yield Ok(StreamEvent::node_start(GET_CONTEXT, step));
            let started = Instant::now();

            let context = this
                .extractor
                .extract(&state.messages, &state.context)
                .instrument(brief_telemetry::node_span(GET_CONTEXT, &thread_id, step))
                .await;
            state.context = context;
            let question = match this.gate.decide(&state.context) {
                GateDecision::Ask { field, question } => {
                    tracing::info!(%field, "asking for missing context");
                    append_messages(&mut state.messages, [question.clone()]);
                    Some(question)
                }
                GateDecision::Proceed => None,
            };

            if let Err(e) = this.commit(&thread_id, &state, step, GET_CONTEXT).await {
                yield Err(e);
                return;
            }
            let asked = question.is_some();
            if let Some(question) = question {
                yield Ok(StreamEvent::message(GET_CONTEXT, question));
            }
            yield Ok(StreamEvent::node_end(GET_CONTEXT, step, started.elapsed().as_millis() as u64));

            if asked {
                yield Ok(StreamEvent::done(state, step + 1));
                return;
            }

            step += 1;
            yield Ok(StreamEvent::node_start(SUPERVISOR, step));
            let started = Instant::now();

            let Dispatch { forwarded, stream: mut pipeline } = match this.dispatcher.start(&state).await {
                Ok(dispatch) => dispatch,
                Err(e) => {
                    yield Err(GraphError::node_failed(SUPERVISOR, e));
                    return;
                }
            };

            let mut produced = Vec::new();
            while let Some(item) = pipeline.next().await {
                match item {
                    Ok(message) => {
                        produced.push(message.clone());
                        yield Ok(StreamEvent::message(SUPERVISOR, message));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "pipeline failed");
                        yield Err(GraphError::node_failed(SUPERVISOR, e));
                        return;
                    }
                }
            }

            state.messages = merge_messages(&forwarded, &produced);
            if let Err(e) = this.commit(&thread_id, &state, step, SUPERVISOR).await {
                yield Err(e);
                return;
            }
            yield Ok(StreamEvent::node_end(SUPERVISOR, step, started.elapsed().as_millis() as u64));
            yield Ok(StreamEvent::done(state, step + 1));
        };

        Box::pin(stream)
    }

    /// Runs one turn to completion and returns the committed state.
    pub async fn invoke(self: Arc<Self>, user_id: &str, input: &str) -> Result<ConversationState> {
        let mut stream = self.run_turn(user_id, input);
        let mut last = None;
        while let Some(event) = stream.next().await {
            if let StreamEvent::Done { state, .. } = event? {
                last = Some(state);
            }
        }
        last.ok_or_else(|| GraphError::SerializationError("turn ended without a final state".into()))
    }
}

/// A running turn. Dropping it releases the session and forgets it when no turn waits.
struct SessionTurn {
    workflow: Arc<ContextWorkflow>,
    thread_id: String,
    lock: Arc<tokio::sync::Mutex<()>>,
    _guard: tokio::sync::OwnedMutexGuard<()>,
}

impl Drop for SessionTurn {
    fn drop(&mut self) {
        let mut sessions = self.workflow.sessions();
        // Held by the map, `lock` and `_guard`; any more is a waiting turn.
        if Arc::strong_count(&self.lock) == 3
            && sessions.get(&self.thread_id).is_some_and(|lock| Arc::ptr_eq(lock, &self.lock))
        {
            sessions.remove(&self.thread_id);
        }
    }
}
