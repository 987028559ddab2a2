use std::ptr;
use std::sync::Arc;
use crate::clock::MonotonicClock;
use crate::framing::{CommandBuffer, FrameAssembler, FrameEvent};
use crate::protocol::standard_table;

pub const DABBLE_EVENT_CONTINUING: i32 = 0;
pub const DABBLE_EVENT_READY: i32 = 1;
pub const DABBLE_EVENT_STALE: i32 = 2;
pub const DABBLE_EVENT_UNKNOWN: i32 = 3;
pub const DABBLE_EVENT_IDLE: i32 = 4;
pub const DABBLE_EVENT_OVERRUN: i32 = 5;

/// Frame assembler over the standard Dabble table, for C callers that do
/// their own dispatch. The last ready command is kept until taken.
pub struct DabbleAssembler{
    inner: FrameAssembler<MonotonicClock>,
    ready: Option<CommandBuffer>,
}

#[no_mangle]
pub extern "C" fn dabble_assembler_new() -> *mut DabbleAssembler{
    let assembler = Box::new(DabbleAssembler{
        inner: FrameAssembler::new(Arc::new(standard_table()), MonotonicClock::new()),
        ready: None,
    });
    Box::into_raw(assembler)
}

#[no_mangle]
pub unsafe extern "C" fn dabble_assembler_free(assembler: *mut DabbleAssembler){
    if !assembler.is_null(){
        unsafe{ drop(Box::from_raw(assembler)); }
    }
}

/// Feed one byte. Returns a `DABBLE_EVENT_*` code, -1 on a null handle.
#[no_mangle]
pub unsafe extern "C" fn dabble_assembler_accept(assembler: *mut DabbleAssembler, byte: u8) -> i32{
    if assembler.is_null(){
        return -1;
    }

    unsafe{
        let a = &mut *assembler;
        match a.inner.accept(byte){
            FrameEvent::Continuing => DABBLE_EVENT_CONTINUING,
            FrameEvent::CommandReady(command) =>{
                a.ready = Some(command);
                DABBLE_EVENT_READY
            }
            FrameEvent::CommandStale => DABBLE_EVENT_STALE,
            FrameEvent::UnknownStart(_) => DABBLE_EVENT_UNKNOWN,
            FrameEvent::Idle => DABBLE_EVENT_IDLE,
            FrameEvent::Overrun => DABBLE_EVENT_OVERRUN,
        }
    }
}

/// Copy out the last ready command. 1 copied, 0 nothing pending,
/// -1 null argument, -2 `max_len` too small (the command stays pending).
#[no_mangle]
pub unsafe extern "C" fn dabble_assembler_take_command(
    assembler: *mut DabbleAssembler,
    out_data: *mut u8,
    out_len: *mut usize,
    max_len: usize,
) -> i32{
    if assembler.is_null() || out_data.is_null() || out_len.is_null(){
        return -1;
    }

    unsafe{
        let a = &mut *assembler;
        match a.ready.take(){
            Some(command) =>{
                if command.len() > max_len{
                    a.ready = Some(command);
                    return -2;
                }
                ptr::copy_nonoverlapping(command.bytes().as_ptr(), out_data, command.len());
                *out_len = command.len();
                1
            }
            None => 0,
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn dabble_assembler_len(assembler: *mut DabbleAssembler) -> usize{
    if assembler.is_null(){
        return 0;
    }
    unsafe{ (&*assembler).inner.len() }
}

#[no_mangle]
pub unsafe extern "C" fn dabble_assembler_reset(assembler: *mut DabbleAssembler){
    if !assembler.is_null(){
        unsafe{
            let a = &mut *assembler;
            a.inner.reset();
            a.ready = None;
        }
    }
}

/// Expected total length of a command for `module`/`function`, or -1 when
/// the module is unknown.
#[no_mangle]
pub extern "C" fn dabble_expected_len(module: u8, function: u8) -> i32{
    match standard_table().resolve(&[0xFF, module, function]){
        Some(resolution) => resolution.expected_len as i32,
        None => -1,
    }
}
