use pyo3::prelude::*;
use pyo3::exceptions::PyValueError;
use std::sync::Arc;
use crate::clock::MonotonicClock;
use crate::framing::{FrameAssembler, FrameEvent};
use crate::gamepad::GamepadReport;
use crate::protocol::standard_table;

#[pyclass]
pub struct PyFrameAssembler{
    inner: FrameAssembler<MonotonicClock>,
}

#[pymethods]
impl PyFrameAssembler{
    #[new]
    fn new() -> Self{
        PyFrameAssembler{
            inner: FrameAssembler::new(Arc::new(standard_table()), MonotonicClock::new()),
        }
    }

    /// Returns `(kind, command)`; `command` is set for "ready" and "unknown".
    fn accept(&mut self, byte: u8) -> (&'static str, Option<Vec<u8>>){
        match self.inner.accept(byte){
            FrameEvent::Continuing => ("continuing", None),
            FrameEvent::CommandReady(command) => ("ready", Some(command.into_bytes())),
            FrameEvent::CommandStale => ("stale", None),
            FrameEvent::UnknownStart(command) => ("unknown", Some(command.into_bytes())),
            FrameEvent::Idle => ("idle", None),
            FrameEvent::Overrun => ("overrun", None),
        }
    }

    /// Feed a chunk, returning every ready command in order.
    fn feed(&mut self, data: &[u8]) -> Vec<Vec<u8>>{
        data.iter()
            .filter_map(|&b| match self.inner.accept(b){
                FrameEvent::CommandReady(command) => Some(command.into_bytes()),
                _ => None,
            })
            .collect()
    }

    fn reset(&mut self){
        self.inner.reset();
    }

    fn len(&self) -> usize{
        self.inner.len()
    }

    fn is_idle(&self) -> bool{
        self.inner.is_idle()
    }
}

/// Event names for one complete gamepad command.
#[pyfunction]
fn decode_gamepad(command: &[u8]) -> PyResult<Vec<String>>{
    let report = GamepadReport::parse(command)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(report.events().iter().map(|e| e.name()).collect())
}

#[pymodule]
fn dabble_link(_py: Python, m: &PyModule) -> PyResult<()>{
    m.add_class::<PyFrameAssembler>()?;
    m.add_function(wrap_pyfunction!(decode_gamepad, m)?)?;
    Ok(())
}
