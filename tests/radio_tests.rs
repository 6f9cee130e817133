//! Radio Control Tests
//!
//! Bring-up ordering and radio interrupt servicing against recording fakes.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test radio_tests

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use nrf24_firmware::config::{pins, AUTO_ACK, PAYLOAD_WIDTH};
use nrf24_firmware::hal::{ClockControl, EdgeInterrupt, IrqHandler, PinControl, ReadyWait};
use nrf24_firmware::radio::irq::{self, EdgeCounter, RadioIrq};
use nrf24_firmware::radio::setup::{self, RadioLines, SetupError};
use nrf24_firmware::radio::{RadioRegisters, Role};
use nrf24_firmware::types::{Edge, PinId, Port};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    ClockEnable(Port),
    Output(PinId),
    Input(PinId),
    SetEdge(PinId, Edge),
    Register(PinId),
    EnableLine(PinId),
    ClearPending(PinId),
    RadioInit(Role, u8, bool),
    FlushRx,
    FlushTx,
    ClearIrq,
    Send(u8),
    Listen,
}

type Log = Rc<RefCell<Vec<Op>>>;

/// Board whose clock domains become ready as soon as they are enabled
struct FakeBoard {
    log: Log,
    ready: Vec<Port>,
}

impl FakeBoard {
    fn new(log: &Log) -> Self {
        Self {
            log: Rc::clone(log),
            ready: Vec::new(),
        }
    }
}

impl ClockControl for FakeBoard {
    fn is_ready(&mut self, port: Port) -> bool {
        self.ready.contains(&port)
    }

    fn enable(&mut self, port: Port) {
        self.log.borrow_mut().push(Op::ClockEnable(port));
        self.ready.push(port);
    }
}

impl PinControl for FakeBoard {
    fn make_output(&mut self, pin: PinId) {
        self.log.borrow_mut().push(Op::Output(pin));
    }

    fn make_input(&mut self, pin: PinId) {
        self.log.borrow_mut().push(Op::Input(pin));
    }
}

impl EdgeInterrupt for FakeBoard {
    fn set_edge(&mut self, pin: PinId, edge: Edge) {
        self.log.borrow_mut().push(Op::SetEdge(pin, edge));
    }

    fn register(&mut self, pin: PinId, _handler: IrqHandler) {
        self.log.borrow_mut().push(Op::Register(pin));
    }

    fn enable_line(&mut self, pin: PinId) {
        self.log.borrow_mut().push(Op::EnableLine(pin));
    }

    fn clear_pending(&mut self, pin: PinId) {
        self.log.borrow_mut().push(Op::ClearPending(pin));
    }
}

/// Radio model with interrupt flags and an RX FIFO
struct FakeRadio {
    log: Log,
    flags: u8,
    rx_fifo: usize,
}

impl FakeRadio {
    fn new(log: &Log) -> Self {
        Self {
            log: Rc::clone(log),
            flags: 0,
            rx_fifo: 0,
        }
    }
}

impl RadioRegisters for FakeRadio {
    fn initialize(&mut self, role: Role, payload_width: u8, auto_ack: bool) {
        self.log.borrow_mut().push(Op::RadioInit(role, payload_width, auto_ack));
    }

    fn flush_rx(&mut self) {
        self.rx_fifo = 0;
        self.log.borrow_mut().push(Op::FlushRx);
    }

    fn flush_tx(&mut self) {
        self.log.borrow_mut().push(Op::FlushTx);
    }

    fn clear_all_irq(&mut self) {
        self.flags = 0;
        self.log.borrow_mut().push(Op::ClearIrq);
    }

    fn send_byte(&mut self, byte: u8) {
        self.log.borrow_mut().push(Op::Send(byte));
    }

    fn listen(&mut self) {
        self.log.borrow_mut().push(Op::Listen);
    }
}

fn handler() {}

fn clocks_of(ops: &[Op]) -> Vec<Port> {
    ops.iter()
        .filter_map(|op| match op {
            Op::ClockEnable(port) => Some(*port),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Bring-up Tests
// ============================================================================

#[test]
fn lines_default_to_board_wiring() {
    let lines = RadioLines::default();
    assert_eq!(lines.ce, pins::RADIO_CE);
    assert_eq!(lines.csn, pins::RADIO_CSN);
    assert_eq!(lines.irq, pins::RADIO_IRQ);
}

#[test]
fn initialize_runs_in_order() {
    let log = Log::default();
    let mut board = FakeBoard::new(&log);
    let mut radio = FakeRadio::new(&log);
    let lines = RadioLines::BOARD;

    setup::initialize(&mut board, &mut radio, lines, handler, ReadyWait::Unbounded).unwrap();

    let expected = vec![
        Op::ClockEnable(lines.ce.port()),
        Op::ClockEnable(lines.csn.port()),
        Op::ClockEnable(lines.irq.port()),
        Op::Output(lines.ce),
        Op::Output(lines.csn),
        Op::Input(lines.irq),
        Op::SetEdge(lines.irq, Edge::Falling),
        Op::Register(lines.irq),
        Op::EnableLine(lines.irq),
        Op::RadioInit(Role::Receiver, PAYLOAD_WIDTH, AUTO_ACK),
        Op::FlushRx,
        Op::FlushTx,
    ];
    assert_eq!(*log.borrow(), expected);
}

#[test]
fn initialize_skips_running_clock_domains() {
    let log = Log::default();
    let mut board = FakeBoard::new(&log);
    let mut radio = FakeRadio::new(&log);
    let lines = RadioLines {
        ce: PinId::new(Port::B, 0),
        csn: PinId::new(Port::B, 1),
        irq: PinId::new(Port::B, 2),
    };

    setup::initialize(&mut board, &mut radio, lines, handler, ReadyWait::Unbounded).unwrap();
    assert_eq!(clocks_of(&log.borrow()), vec![Port::B]);
}

#[test]
fn initialize_with_ready_clocks_enables_nothing() {
    let log = Log::default();
    let mut board = FakeBoard::new(&log);
    board.ready = vec![Port::A, Port::B, Port::C];
    let mut radio = FakeRadio::new(&log);

    setup::initialize(&mut board, &mut radio, RadioLines::BOARD, handler, ReadyWait::Unbounded).unwrap();
    assert!(clocks_of(&log.borrow()).is_empty());
}

#[test]
fn bounded_wait_succeeds_when_clock_comes_up() {
    let log = Log::default();
    let mut board = FakeBoard::new(&log);
    let mut radio = FakeRadio::new(&log);
    setup::initialize(&mut board, &mut radio, RadioLines::BOARD, handler, ReadyWait::Bounded(3)).unwrap();
    assert_eq!(log.borrow().last(), Some(&Op::FlushTx));
}

/// Clock domain that never comes up
struct DeadClock;

impl ClockControl for DeadClock {
    fn is_ready(&mut self, _port: Port) -> bool {
        false
    }

    fn enable(&mut self, _port: Port) {}
}

impl PinControl for DeadClock {
    fn make_output(&mut self, _pin: PinId) {}

    fn make_input(&mut self, _pin: PinId) {}
}

impl EdgeInterrupt for DeadClock {
    fn set_edge(&mut self, _pin: PinId, _edge: Edge) {}

    fn register(&mut self, _pin: PinId, _handler: IrqHandler) {}

    fn enable_line(&mut self, _pin: PinId) {}

    fn clear_pending(&mut self, _pin: PinId) {}
}

/// Radio that ignores everything
struct NullRadio;

impl RadioRegisters for NullRadio {
    fn initialize(&mut self, _role: Role, _payload_width: u8, _auto_ack: bool) {}

    fn flush_rx(&mut self) {}

    fn flush_tx(&mut self) {}

    fn clear_all_irq(&mut self) {}

    fn send_byte(&mut self, _byte: u8) {}

    fn listen(&mut self) {}
}

#[test]
fn bounded_wait_reports_dead_clock() {
    let result = setup::initialize(
        &mut DeadClock,
        &mut NullRadio,
        RadioLines::BOARD,
        handler,
        ReadyWait::Bounded(100),
    );
    assert_eq!(result, Err(SetupError::ClockNotReady(pins::RADIO_CE)));
}

#[test]
fn unbounded_wait_hangs_on_dead_clock() {
    let (tx, rx) = mpsc::channel();
    // The spawned thread never finishes; it is abandoned when the test binary exits.
    thread::spawn(move || {
        let result = setup::initialize(
            &mut DeadClock,
            &mut NullRadio,
            RadioLines::BOARD,
            handler,
            ReadyWait::Unbounded,
        );
        let _ = tx.send(result);
    });

    assert_eq!(
        rx.recv_timeout(Duration::from_millis(200)),
        Err(mpsc::RecvTimeoutError::Timeout)
    );
}

#[test]
fn setup_error_display() {
    let err = SetupError::ClockNotReady(PinId::new(Port::C, 7));
    assert_eq!(err.to_string(), "clock domain of PC7 never became ready");
}

#[test]
fn ready_wait_bounded_counts_polls() {
    struct SlowClock(u32);

    impl ClockControl for SlowClock {
        fn is_ready(&mut self, _port: Port) -> bool {
            self.0 = self.0.saturating_sub(1);
            self.0 == 0
        }

        fn enable(&mut self, _port: Port) {}
    }

    assert!(ReadyWait::Bounded(5).wait(&mut SlowClock(5), Port::A));
    assert!(!ReadyWait::Bounded(4).wait(&mut SlowClock(6), Port::A));
    assert!(!ReadyWait::Bounded(0).wait(&mut SlowClock(1), Port::A));
}

// ============================================================================
// Interrupt Handler Tests
// ============================================================================

#[test]
fn service_clears_flags_then_fifo_then_line() {
    let log = Log::default();
    let mut board = FakeBoard::new(&log);
    let mut radio = FakeRadio::new(&log);
    radio.flags = 0x70;
    radio.rx_fifo = 3;

    irq::service(&mut radio, &mut board, pins::RADIO_IRQ);

    assert_eq!(
        *log.borrow(),
        vec![Op::ClearIrq, Op::FlushRx, Op::ClearPending(pins::RADIO_IRQ)]
    );
    assert_eq!(radio.flags, 0);
    assert_eq!(radio.rx_fifo, 0);
}

#[test]
fn service_is_idempotent() {
    let log = Log::default();
    let mut board = FakeBoard::new(&log);
    let mut radio = FakeRadio::new(&log);
    radio.flags = 0x40;
    radio.rx_fifo = 1;

    for _ in 0..5 {
        irq::service(&mut radio, &mut board, pins::RADIO_IRQ);
        assert_eq!(radio.flags, 0);
        assert_eq!(radio.rx_fifo, 0);
    }
    assert_eq!(log.borrow().len(), 15);
}

#[test]
fn service_never_transmits_or_changes_role() {
    let log = Log::default();
    let mut board = FakeBoard::new(&log);
    let mut radio = FakeRadio::new(&log);
    irq::service(&mut radio, &mut board, pins::RADIO_IRQ);
    assert!(!log
        .borrow()
        .iter()
        .any(|op| matches!(op, Op::Send(_) | Op::Listen | Op::RadioInit(..))));
}

#[test]
fn radio_irq_counts_edges() {
    let log = Log::default();
    let mut board = FakeBoard::new(&log);
    let mut radio = FakeRadio::new(&log);
    let edges = EdgeCounter::new();
    let ctx = RadioIrq::new(pins::RADIO_IRQ, &edges);

    assert_eq!(ctx.line(), pins::RADIO_IRQ);
    assert_eq!(edges.count(), 0);
    ctx.on_edge(&mut radio, &mut board);
    ctx.on_edge(&mut radio, &mut board);
    assert_eq!(edges.count(), 2);
    assert_eq!(log.borrow().last(), Some(&Op::ClearPending(pins::RADIO_IRQ)));
}
