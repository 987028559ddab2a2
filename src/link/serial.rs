use std::io::{ErrorKind, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use serialport::SerialPort;
use crate::clock::Clock;
use crate::config::LinkConfig;
use crate::error::Result;
use crate::protocol::VERSION_QUERY;
use super::pipeline::LinkPipeline;

pub const READ_CHUNK: usize = 256;

/// Byte transport to the phone-side Bluetooth module.
///
/// Generic over the port so tests can drive it from memory; the real
/// thing is `SerialLink<Box<dyn SerialPort>>` from [`SerialLink::open`].
pub struct SerialLink<P: Read + Write>{
    port: P,
    running: Arc<AtomicBool>,
    bytes_read: u64,
}

impl SerialLink<Box<dyn SerialPort>>{
    pub fn open(config: &LinkConfig) -> Result<Self>{
        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .open()?;

        tracing::info!(port = %config.port, baud = config.baud_rate, "serial link open");
        Ok(SerialLink::new(port))
    }
}

impl<P: Read + Write> SerialLink<P>{
    pub fn new(port: P) -> Self{
        SerialLink{
            port,
            running: Arc::new(AtomicBool::new(false)),
            bytes_read: 0,
        }
    }

    /// Ask the app for its version. Sent once, before any reads.
    pub fn send_query(&mut self) -> Result<()>{
        self.port.write_all(VERSION_QUERY.as_bytes())?;
        self.port.flush()?;
        tracing::debug!(query = VERSION_QUERY, "version query sent");
        Ok(())
    }

    /// One read from the port, every byte fed through `pipeline`.
    /// A read timeout counts as zero bytes.
    pub fn poll_once<C: Clock>(&mut self, pipeline: &mut LinkPipeline<C>) -> Result<usize>{
        let mut read_buf = [0u8; READ_CHUNK];

        match self.port.read(&mut read_buf){
            Ok(n) =>{
                for &byte in &read_buf[..n]{
                    pipeline.feed(byte);
                }
                self.bytes_read += n as u64;
                Ok(n)
            }
            Err(ref e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::Interrupted => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Read and dispatch until the running flag is cleared. `tick` runs after
    /// every read so timers get serviced even when the link is quiet.
    pub fn run<C, F>(&mut self, pipeline: &mut LinkPipeline<C>, mut tick: F) -> Result<()>
    where
        C: Clock,
        F: FnMut(&LinkPipeline<C>),
    {
        self.running.store(true, Ordering::SeqCst);
        self.send_query()?;

        while self.running.load(Ordering::SeqCst){
            if let Err(e) = self.poll_once(pipeline){
                tracing::error!(error = %e, "serial read error");
            }
            tick(pipeline);
        }

        tracing::info!(bytes = self.bytes_read, "serial link stopped");
        Ok(())
    }

    pub fn running_flag(&self) -> Arc<AtomicBool>{
        Arc::clone(&self.running)
    }

    pub fn bytes_read(&self) -> u64{
        self.bytes_read
    }

    pub fn port(&self) -> &P{
        &self.port
    }
}

pub fn stop_link(running: &Arc<AtomicBool>){
    running.store(false, Ordering::SeqCst);
}
