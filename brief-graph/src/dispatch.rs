//! Hand-off of a completed conversation to the report pipeline.

use crate::reducer::merge_messages;
use async_trait::async_trait;
use brief_core::{ConversationState, Message};
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

/// Messages a pipeline produces while it works, in order.
pub type PipelineStream = Pin<Box<dyn Stream<Item = brief_core::Result<Message>> + Send>>;

/// Multi-agent work that runs once the report context is complete.
///
/// The pipeline receives the whole conversation and yields only the messages it adds.
/// Re-yielding a message it was given is harmless: the reducer drops it.
#[async_trait]
pub trait Pipeline: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self, messages: Vec<Message>) -> brief_core::Result<PipelineStream>;
}

/// A started dispatch: the conversation as forwarded plus the pipeline's output.
pub struct Dispatch {
    pub forwarded: Vec<Message>,
    pub stream: PipelineStream,
}

pub struct Dispatcher {
    pipeline: Arc<dyn Pipeline>,
}

impl Dispatcher {
    pub fn new(pipeline: Arc<dyn Pipeline>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline_name(&self) -> &str {
        self.pipeline.name()
    }

    /// The user-role message that carries the completed context to the pipeline.
    pub fn context_summary(state: &ConversationState) -> Message {
        Message::human(state.context.summary())
    }

    /// Appends the context summary and starts the pipeline.
    pub async fn start(&self, state: &ConversationState) -> brief_core::Result<Dispatch> {
        let forwarded = merge_messages(&state.messages, &[Self::context_summary(state)]);
        tracing::info!(
            pipeline = self.pipeline.name(),
            session_id = %state.session_id,
            messages = forwarded.len(),
            "dispatching to pipeline"
        );
        let stream = self.pipeline.run(forwarded.clone()).await?;
        Ok(Dispatch { forwarded, stream })
    }

    /// Runs the pipeline to completion and returns the updated message log.
    ///
    /// The first pipeline error aborts the dispatch; nothing it produced is kept.
    pub async fn dispatch(&self, state: &ConversationState) -> brief_core::Result<Vec<Message>> {
        let Dispatch { forwarded, mut stream } = self.start(state).await?;
        let mut produced = Vec::new();
        while let Some(message) = stream.next().await {
            produced.push(message?);
        }
        Ok(merge_messages(&forwarded, &produced))
    }
}
