use std::sync::Arc;
use crate::clock::Clock;
use crate::events::EventBus;
use crate::framing::{Dispatcher, DispatchOutcome, DispatchStats, FrameAssembler, FrameEvent, FrameStats};
use crate::protocol::ModuleTable;

/// Raw bytes in, handler calls and bus events out.
///
/// Owns the assembler, the dispatcher and the bus for one link. Everything
/// runs on the caller's turn.
pub struct LinkPipeline<C: Clock>{
    assembler: FrameAssembler<C>,
    dispatcher: Dispatcher,
    bus: EventBus,
    last_outcome: Option<DispatchOutcome>,
}

impl<C: Clock> LinkPipeline<C>{
    pub fn new(table: Arc<ModuleTable>, clock: C) -> Self{
        LinkPipeline{
            assembler: FrameAssembler::new(table, clock),
            dispatcher: Dispatcher::new(),
            bus: EventBus::new(),
            last_outcome: None,
        }
    }

    pub fn with_staleness(mut self, staleness_ms: u64) -> Self{
        self.assembler = self.assembler.with_staleness(staleness_ms);
        self
    }

    pub fn feed(&mut self, byte: u8) -> FrameEvent{
        let event = self.assembler.accept(byte);

        match &event{
            FrameEvent::CommandReady(command) =>{
                //always resolves: the assembler only completes known modules
                if let Some(resolution) = self.assembler.table().resolve(command.bytes()){
                    tracing::debug!(
                        module = resolution.module_name,
                        function = resolution.function_name.unwrap_or("?"),
                        len = command.len(),
                        "command"
                    );
                    let outcome = self.dispatcher.dispatch(command, &resolution, &self.bus);
                    self.last_outcome = Some(outcome);
                }
            }
            FrameEvent::UnknownStart(command) =>{
                tracing::warn!(bytes = ?command.bytes(), "unknown command received");
            }
            FrameEvent::CommandStale =>{
                tracing::debug!("stale command discarded");
            }
            FrameEvent::Overrun =>{
                tracing::debug!("unterminated command discarded");
            }
            FrameEvent::Continuing | FrameEvent::Idle => {}
        }
        event
    }

    /// Feed a chunk. Returns how many commands completed.
    pub fn feed_all(&mut self, bytes: &[u8]) -> usize{
        bytes.iter()
            .filter(|b| matches!(self.feed(**b), FrameEvent::CommandReady(_)))
            .count()
    }

    pub fn bus(&self) -> &EventBus{
        &self.bus
    }

    pub fn assembler(&self) -> &FrameAssembler<C>{
        &self.assembler
    }

    pub fn take_last_outcome(&mut self) -> Option<DispatchOutcome>{
        self.last_outcome.take()
    }

    pub fn frame_stats(&self) -> FrameStats{
        self.assembler.stats()
    }

    pub fn dispatch_stats(&self) -> DispatchStats{
        self.dispatcher.stats()
    }
}
