use std::panic::{self, AssertUnwindSafe};
use crate::error::HandlerFault;
use crate::events::EventBus;
use crate::protocol::Resolution;
use super::assembler::CommandBuffer;

/// Decodes the payload of one recognized command.
///
/// Handlers run on the byte-reception turn and must return quickly.
pub trait CommandHandler: Send + Sync{
    fn handle(&self, bytes: &[u8], bus: &EventBus) -> Result<(), HandlerFault>;
}

pub struct FnHandler<F>{
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&[u8], &EventBus) -> Result<(), HandlerFault> + Send + Sync,
{
    pub fn new(f: F) -> Self{
        FnHandler{ f }
    }
}

impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(&[u8], &EventBus) -> Result<(), HandlerFault> + Send + Sync,
{
    fn handle(&self, bytes: &[u8], bus: &EventBus) -> Result<(), HandlerFault>{
        (self.f)(bytes, bus)
    }
}

//accepts and ignores
pub struct NoopHandler;

impl CommandHandler for NoopHandler{
    fn handle(&self, _bytes: &[u8], _bus: &EventBus) -> Result<(), HandlerFault>{
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome{
    Handled,
    Unhandled,
    Faulted(HandlerFault),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats{
    pub handled: u64,
    pub unhandled: u64,
    pub faulted: u64,
}

/// Routes completed commands to their handlers.
///
/// A failing or panicking handler is logged and counted; it never reaches
/// the caller, so the reception loop keeps running.
#[derive(Debug, Default)]
pub struct Dispatcher{
    stats: DispatchStats,
}

impl Dispatcher{
    pub fn new() -> Self{
        Dispatcher{ stats: DispatchStats::default() }
    }

    pub fn dispatch(&mut self, command: &CommandBuffer, resolution: &Resolution, bus: &EventBus) -> DispatchOutcome{
        let Some(handler) = resolution.handler.as_ref() else{
            self.stats.unhandled += 1;
            tracing::debug!(
                module = resolution.module_name,
                function = resolution.function_name.unwrap_or("?"),
                bytes = ?command.bytes(),
                "no handler for command"
            );
            return DispatchOutcome::Unhandled;
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(command.bytes(), bus)));

        let fault = match result{
            Ok(Ok(())) =>{
                self.stats.handled += 1;
                return DispatchOutcome::Handled;
            }
            Ok(Err(fault)) => fault,
            Err(payload) => HandlerFault::Panicked(panic_message(payload.as_ref())),
        };

        self.stats.faulted += 1;
        tracing::warn!(
            module = resolution.module_name,
            function = resolution.function_name.unwrap_or("?"),
            error = %fault,
            "command handler failed"
        );
        DispatchOutcome::Faulted(fault)
    }

    pub fn stats(&self) -> DispatchStats{
        self.stats
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String{
    if let Some(s) = payload.downcast_ref::<&str>(){
        s.to_string()
    }else if let Some(s) = payload.downcast_ref::<String>(){
        s.clone()
    }else{
        "unknown panic".to_string()
    }
}
