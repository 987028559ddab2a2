use std::sync::Arc;
use crate::clock::Clock;
use crate::protocol::{ModuleTable, START_MARKER, TERMINATOR, MIN_COMMAND_LEN, STALENESS_MS};

/// Bytes accumulated since the last start marker, with the time the
/// marker arrived. Empty with `started_at == 0` when nothing is in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBuffer{
    bytes: Vec<u8>,
    started_at: u64,
}

impl CommandBuffer{
    fn begin(now: u64) -> Self{
        let mut bytes = Vec::with_capacity(32);
        bytes.push(START_MARKER);
        CommandBuffer{ bytes, started_at: now }
    }

    pub fn bytes(&self) -> &[u8]{
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8>{
        self.bytes
    }

    pub fn started_at(&self) -> u64{
        self.started_at
    }

    pub fn len(&self) -> usize{
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool{
        self.bytes.is_empty()
    }

    pub fn module_id(&self) -> Option<u8>{
        self.bytes.get(1).copied()
    }

    pub fn function_id(&self) -> Option<u8>{
        self.bytes.get(2).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent{
    Continuing,
    CommandReady(CommandBuffer),
    /// In-progress command exceeded the staleness window and was dropped.
    /// If the triggering byte was a start marker it opened a fresh command.
    CommandStale,
    UnknownStart(CommandBuffer),
    //non-marker byte with nothing in progress
    Idle,
    /// Command reached its expected length without a terminator and
    /// another payload byte arrived.
    Overrun,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats{
    pub ready: u64,
    pub stale: u64,
    pub unknown: u64,
    pub overrun: u64,
    pub dropped: u64,
}

/// Recovers command boundaries from the raw byte stream, one byte at a time.
///
/// A `0xFF` only opens a new command when nothing is in progress, the
/// current command is stale, or the current command already holds its full
/// expected length. Otherwise it is payload.
pub struct FrameAssembler<C: Clock>{
    table: Arc<ModuleTable>,
    clock: C,
    current: CommandBuffer,
    staleness_ms: u64,
    stats: FrameStats,
}

impl<C: Clock> FrameAssembler<C>{
    pub fn new(table: Arc<ModuleTable>, clock: C) -> Self{
        FrameAssembler{
            table,
            clock,
            current: CommandBuffer::default(),
            staleness_ms: STALENESS_MS,
            stats: FrameStats::default(),
        }
    }

    pub fn with_staleness(mut self, staleness_ms: u64) -> Self{
        self.staleness_ms = staleness_ms;
        self
    }

    pub fn accept(&mut self, byte: u8) -> FrameEvent{
        let now = self.clock.now_ms();
        self.accept_at(byte, now)
    }

    pub fn accept_at(&mut self, byte: u8, now: u64) -> FrameEvent{
        if byte == START_MARKER{
            if self.is_stale(now){
                self.stats.stale += 1;
                tracing::debug!(len = self.current.len(), "stale command dropped, restarting on start marker");
                self.current = CommandBuffer::begin(now);
                return FrameEvent::CommandStale;
            }
            if self.current.is_empty() || self.is_complete(){
                self.current = CommandBuffer::begin(now);
                return FrameEvent::Continuing;
            }
            //0xFF inside an open command is payload
        }

        if self.current.is_empty(){
            self.stats.dropped += 1;
            return FrameEvent::Idle;
        }

        if self.is_stale(now){
            self.stats.stale += 1;
            tracing::debug!(len = self.current.len(), "stale command dropped");
            self.reset();
            return FrameEvent::CommandStale;
        }

        if self.is_complete(){
            self.stats.overrun += 1;
            tracing::debug!(len = self.current.len(), "unterminated command overran its length");
            self.reset();
            return FrameEvent::Overrun;
        }

        self.current.bytes.push(byte);

        if self.current.len() >= MIN_COMMAND_LEN && byte == TERMINATOR{
            match self.table.resolve(&self.current.bytes){
                None =>{
                    self.stats.unknown += 1;
                    return FrameEvent::UnknownStart(std::mem::take(&mut self.current));
                }
                Some(res) if self.current.len() >= res.expected_len =>{
                    self.stats.ready += 1;
                    return FrameEvent::CommandReady(std::mem::take(&mut self.current));
                }
                Some(_) => {}
            }
        }

        FrameEvent::Continuing
    }

    fn is_stale(&self, now: u64) -> bool{
        !self.current.is_empty() && now.saturating_sub(self.current.started_at) > self.staleness_ms
    }

    //unknown modules never count as complete
    fn is_complete(&self) -> bool{
        self.table.resolve(&self.current.bytes)
            .map_or(false, |res| self.current.len() >= res.expected_len)
    }

    pub fn reset(&mut self){
        self.current = CommandBuffer::default();
    }

    pub fn current(&self) -> &CommandBuffer{
        &self.current
    }

    pub fn len(&self) -> usize{
        self.current.len()
    }

    pub fn is_idle(&self) -> bool{
        self.current.is_empty()
    }

    pub fn started_at(&self) -> u64{
        self.current.started_at
    }

    pub fn stats(&self) -> FrameStats{
        self.stats
    }

    pub fn table(&self) -> &Arc<ModuleTable>{
        &self.table
    }
}

#[cfg(test)]
mod tests{
    use super::*;
    use crate::clock::ManualClock;
    use crate::protocol::standard_table;

    fn assembler() -> (FrameAssembler<ManualClock>, ManualClock){
        let clock = ManualClock::new(10_000);
        (FrameAssembler::new(Arc::new(standard_table()), clock.clone()), clock)
    }

    fn feed(asm: &mut FrameAssembler<ManualClock>, bytes: &[u8]) -> Vec<FrameEvent>{
        bytes.iter().map(|b| asm.accept(*b)).collect()
    }

    const GAMEPAD_CMD: [u8; 8] = [0xFF, 0x01, 0x01, 0x00, 0x21, 0x00, 0x00, 0x00];

    #[test]
    fn test_gamepad_command_ready(){
        let (mut asm, _) = assembler();
        let events = feed(&mut asm, &GAMEPAD_CMD);

        for ev in &events[..7]{
            assert_eq!(*ev, FrameEvent::Continuing);
        }
        match &events[7]{
            FrameEvent::CommandReady(cmd) =>{
                assert_eq!(cmd.bytes(), &GAMEPAD_CMD);
                assert_eq!(cmd.started_at(), 10_000);
                assert_eq!(cmd.module_id(), Some(0x01));
                assert_eq!(cmd.function_id(), Some(0x01));
            }
            other => panic!("expected CommandReady, got {:?}", other),
        }
        assert!(asm.is_idle());
        assert_eq!(asm.started_at(), 0);
        assert_eq!(asm.stats().ready, 1);
    }

    #[test]
    fn test_terminator_before_expected_length_keeps_accumulating(){
        let (mut asm, _) = assembler();
        //byte 3 is 0x00 at length 4, but gamepad needs 8
        let events = feed(&mut asm, &GAMEPAD_CMD[..4]);
        assert_eq!(events[3], FrameEvent::Continuing);
        assert_eq!(asm.len(), 4);
    }

    #[test]
    fn test_non_marker_byte_while_idle_is_dropped(){
        let (mut asm, _) = assembler();
        assert_eq!(asm.accept(0x01), FrameEvent::Idle);
        assert_eq!(asm.accept(0x00), FrameEvent::Idle);
        assert!(asm.is_idle());
        assert_eq!(asm.stats().dropped, 2);
    }

    #[test]
    fn test_start_marker_in_payload_is_data(){
        let (mut asm, _) = assembler();
        feed(&mut asm, &[0xFF, 0x01, 0x01, 0x00]);
        assert_eq!(asm.accept(0xFF), FrameEvent::Continuing);
        assert_eq!(asm.len(), 5);
        assert_eq!(asm.current().bytes()[4], 0xFF);

        let events = feed(&mut asm, &[0x00, 0x00, 0x00]);
        match &events[2]{
            FrameEvent::CommandReady(cmd) => assert_eq!(cmd.bytes()[4], 0xFF),
            other => panic!("expected CommandReady, got {:?}", other),
        }
    }

    #[test]
    fn test_start_marker_after_complete_unterminated_buffer_restarts(){
        let (mut asm, _) = assembler();
        //8 bytes, last one not a terminator
        feed(&mut asm, &[0xFF, 0x01, 0x01, 0x00, 0x01, 0x00, 0x00, 0x05]);
        assert_eq!(asm.len(), 8);

        assert_eq!(asm.accept(0xFF), FrameEvent::Continuing);
        assert_eq!(asm.current().bytes(), &[0xFF]);
    }

    #[test]
    fn test_overrun_on_complete_unterminated_buffer(){
        let (mut asm, _) = assembler();
        feed(&mut asm, &[0xFF, 0x01, 0x01, 0x00, 0x01, 0x00, 0x00, 0x05]);
        assert_eq!(asm.accept(0x00), FrameEvent::Overrun);
        assert!(asm.is_idle());
        assert_eq!(asm.stats().overrun, 1);
    }

    #[test]
    fn test_stale_buffer_discarded_on_next_byte(){
        let (mut asm, clock) = assembler();
        feed(&mut asm, &[0xFF, 0x01, 0x01]);
        clock.advance(1001);
        assert_eq!(asm.accept(0x00), FrameEvent::CommandStale);
        assert!(asm.is_idle());
        assert_eq!(asm.started_at(), 0);
    }

    #[test]
    fn test_stale_buffer_with_start_marker_opens_fresh_command(){
        let (mut asm, clock) = assembler();
        feed(&mut asm, &[0xFF, 0x01, 0x01]);
        clock.advance(1500);
        assert_eq!(asm.accept(0xFF), FrameEvent::CommandStale);
        assert_eq!(asm.current().bytes(), &[0xFF]);
        assert_eq!(asm.started_at(), 11_500);

        let events = feed(&mut asm, &GAMEPAD_CMD[1..]);
        assert!(matches!(events[6], FrameEvent::CommandReady(_)));
    }

    #[test]
    fn test_exactly_at_threshold_is_not_stale(){
        let (mut asm, clock) = assembler();
        feed(&mut asm, &GAMEPAD_CMD[..7]);
        clock.advance(1000);
        assert!(matches!(asm.accept(0x00), FrameEvent::CommandReady(_)));
    }

    #[test]
    fn test_stale_never_ready(){
        let (mut asm, clock) = assembler();
        feed(&mut asm, &GAMEPAD_CMD[..7]);
        clock.advance(1001);
        assert_eq!(asm.accept(0x00), FrameEvent::CommandStale);
        assert_eq!(asm.stats().ready, 0);
    }

    #[test]
    fn test_unknown_module(){
        let (mut asm, clock) = assembler();
        let events = feed(&mut asm, &[0xFF, 0x09, 0x00]);
        assert!(events.iter().all(|e| *e == FrameEvent::Continuing));

        clock.advance(950);
        match asm.accept(0x00){
            FrameEvent::UnknownStart(cmd) => assert_eq!(cmd.bytes(), &[0xFF, 0x09, 0x00, 0x00]),
            other => panic!("expected UnknownStart, got {:?}", other),
        }
        assert!(asm.is_idle());
        assert_eq!(asm.started_at(), 0);
    }

    #[test]
    fn test_start_marker_inside_unknown_module_is_payload(){
        let (mut asm, _) = assembler();
        feed(&mut asm, &[0xFF, 0x09, 0x01]);
        assert_eq!(asm.accept(0xFF), FrameEvent::Continuing);
        assert_eq!(asm.len(), 4);
    }

    #[test]
    fn test_unknown_function_uses_module_length(){
        let (mut asm, _) = assembler();
        //sensors default is 10
        let cmd = [0xFF, 0x04, 0x7F, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x00];
        let events = feed(&mut asm, &cmd);
        assert!(events[..9].iter().all(|e| *e == FrameEvent::Continuing));
        assert!(matches!(events[9], FrameEvent::CommandReady(_)));
    }

    #[test]
    fn test_gps_override_length(){
        let (mut asm, _) = assembler();
        let mut cmd = vec![0xFF, 0x04, 0x09];
        cmd.extend_from_slice(&[0x00; 12]);
        let events = feed(&mut asm, &cmd);
        assert_eq!(events.iter().filter(|e| matches!(e, FrameEvent::CommandReady(_))).count(), 1);
        match events.last(){
            Some(FrameEvent::CommandReady(c)) => assert_eq!(c.len(), 15),
            other => panic!("expected CommandReady, got {:?}", other),
        }
    }

    #[test]
    fn test_back_to_back_commands(){
        let (mut asm, clock) = assembler();
        let mut stream = GAMEPAD_CMD.to_vec();
        stream.extend_from_slice(&GAMEPAD_CMD);
        let events: Vec<_> = stream.iter().map(|b|{
            clock.advance(1);
            asm.accept(*b)
        }).collect();
        let ready = events.iter().filter(|e| matches!(e, FrameEvent::CommandReady(_))).count();
        assert_eq!(ready, 2);
    }

    #[test]
    fn test_custom_staleness(){
        let clock = ManualClock::new(0);
        let mut asm = FrameAssembler::new(Arc::new(standard_table()), clock.clone()).with_staleness(50);
        asm.accept(0xFF);
        clock.advance(51);
        assert_eq!(asm.accept(0x01), FrameEvent::CommandStale);
    }
}
