//! Test doubles: a simulated I2C wire with a responding device, a recording display bus, a
//! recording register file and a counting delay.
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::backend::DisplayBus;
use crate::bitbang::SpinDelay;
use crate::gpio::Registers;

/// What the device saw on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start,
    /// a byte clocked in from the master, address bytes included
    Byte(u8),
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub read: bool,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Address { bits: u8, byte: u8 },
    Data { bits: u8, byte: u8 },
    AckOut { then_transmit: bool },
    Transmit { bits: u8, byte: u8 },
    AckIn { nacked: bool },
    Ignore,
}

struct Device {
    address: u8,
    accept: Option<usize>,
    respond: Vec<u8>,
    served: usize,
    phase: Phase,
    drive_low: bool,
    current: Option<Transfer>,
    transfers: Vec<Transfer>,
    events: Vec<Event>,
}

impl Device {
    fn on_start(&mut self) {
        self.finish_transfer();
        self.events.push(Event::Start);
        self.phase = Phase::Address { bits: 0, byte: 0 };
        self.drive_low = false;
    }

    fn on_stop(&mut self) {
        self.finish_transfer();
        self.events.push(Event::Stop);
        self.phase = Phase::Idle;
        self.drive_low = false;
    }

    fn finish_transfer(&mut self) {
        if let Some(transfer) = self.current.take() {
            self.transfers.push(transfer);
        }
    }

    fn on_rise(&mut self, sda: bool) {
        self.phase = match self.phase {
            Phase::Address { bits, byte } => Phase::Address {
                bits: bits + 1,
                byte: (byte << 1) | sda as u8,
            },
            Phase::Data { bits, byte } => Phase::Data {
                bits: bits + 1,
                byte: (byte << 1) | sda as u8,
            },
            Phase::AckIn { .. } => Phase::AckIn { nacked: sda },
            other => other,
        };
    }

    fn on_fall(&mut self) {
        match self.phase {
            Phase::Address { bits: 8, byte } => {
                self.events.push(Event::Byte(byte));
                if byte >> 1 == self.address {
                    let read = byte & 1 == 1;
                    self.current = Some(Transfer {
                        read,
                        bytes: Vec::new(),
                    });
                    self.drive_low = true;
                    self.phase = Phase::AckOut {
                        then_transmit: read,
                    };
                } else {
                    self.phase = Phase::Ignore;
                }
            }
            Phase::Data { bits: 8, byte } => {
                self.events.push(Event::Byte(byte));
                let received = match self.current.as_mut() {
                    Some(transfer) => {
                        transfer.bytes.push(byte);
                        transfer.bytes.len()
                    }
                    None => 0,
                };
                if self.accept.map_or(true, |limit| received <= limit) {
                    self.drive_low = true;
                    self.phase = Phase::AckOut {
                        then_transmit: false,
                    };
                } else {
                    self.phase = Phase::Ignore;
                }
            }
            Phase::AckOut { then_transmit } => {
                self.drive_low = false;
                if then_transmit {
                    self.load_next();
                } else {
                    self.phase = Phase::Data { bits: 0, byte: 0 };
                }
            }
            Phase::Transmit { bits, byte } => {
                let bits = bits + 1;
                if bits == 8 {
                    self.drive_low = false;
                    self.phase = Phase::AckIn { nacked: true };
                } else {
                    self.drive_low = byte & (0x80 >> bits) == 0;
                    self.phase = Phase::Transmit { bits, byte };
                }
            }
            Phase::AckIn { nacked } => {
                if nacked {
                    self.phase = Phase::Ignore;
                } else {
                    self.load_next();
                }
            }
            _ => {}
        }
    }

    fn load_next(&mut self) {
        let byte = if self.respond.is_empty() {
            0xFF
        } else {
            self.respond[self.served % self.respond.len()]
        };
        self.served += 1;
        if let Some(transfer) = self.current.as_mut() {
            transfer.bytes.push(byte);
        }
        self.drive_low = byte & 0x80 == 0;
        self.phase = Phase::Transmit { bits: 0, byte };
    }
}

struct Wire {
    scl_pulled: bool,
    sda_pulled: bool,
    scl: bool,
    sda: bool,
    device: Device,
}

impl Wire {
    fn settle(&mut self) {
        let scl = !self.scl_pulled;
        let sda = !(self.sda_pulled || self.device.drive_low);
        let (old_scl, old_sda) = (self.scl, self.sda);
        self.scl = scl;
        self.sda = sda;

        if scl && old_scl && sda != old_sda {
            if sda {
                self.device.on_stop();
            } else {
                self.device.on_start();
            }
        } else if scl && !old_scl {
            self.device.on_rise(sda);
        } else if !scl && old_scl {
            self.device.on_fall();
        }

        // the device only changes its drive while SCL is low
        self.sda = !(self.sda_pulled || self.device.drive_low);
    }
}

/// An open-drain SCL/SDA pair with a single device attached.
#[derive(Clone)]
pub struct SimBus {
    wire: Rc<RefCell<Wire>>,
}

impl SimBus {
    /// bus with a device answering at 7 bit `address`
    pub fn new(address: u8) -> Self {
        let device = Device {
            address,
            accept: None,
            respond: Vec::new(),
            served: 0,
            phase: Phase::Idle,
            drive_low: false,
            current: None,
            transfers: Vec::new(),
            events: Vec::new(),
        };
        SimBus {
            wire: Rc::new(RefCell::new(Wire {
                scl_pulled: false,
                sda_pulled: false,
                scl: true,
                sda: true,
                device,
            })),
        }
    }

    pub fn scl(&self) -> SimPin {
        SimPin {
            wire: self.wire.clone(),
            line: Line::Scl,
        }
    }

    pub fn sda(&self) -> SimPin {
        SimPin {
            wire: self.wire.clone(),
            line: Line::Sda,
        }
    }

    /// acknowledge only the first `count` data bytes of a transfer
    pub fn accept_data_bytes(&self, count: usize) {
        self.wire.borrow_mut().device.accept = Some(count);
    }

    /// bytes served to read transfers, repeated as needed
    pub fn respond_with(&self, bytes: &[u8]) {
        self.wire.borrow_mut().device.respond = bytes.to_vec();
    }

    pub fn events(&self) -> Vec<Event> {
        self.wire.borrow().device.events.clone()
    }

    pub fn clear_events(&self) {
        self.wire.borrow_mut().device.events.clear();
    }

    /// payload of every completed write transfer addressed to the device
    pub fn received(&self) -> Vec<Vec<u8>> {
        self.wire
            .borrow()
            .device
            .transfers
            .iter()
            .filter(|t| !t.read)
            .map(|t| t.bytes.clone())
            .collect()
    }

    /// both lines released and high
    pub fn is_idle(&self) -> bool {
        let wire = self.wire.borrow();
        wire.scl && wire.sda && !wire.scl_pulled && !wire.sda_pulled
    }
}

#[derive(Clone, Copy)]
enum Line {
    Scl,
    Sda,
}

pub struct SimPin {
    wire: Rc<RefCell<Wire>>,
    line: Line,
}

impl SimPin {
    fn drive(&mut self, pulled: bool) {
        let mut wire = self.wire.borrow_mut();
        match self.line {
            Line::Scl => wire.scl_pulled = pulled,
            Line::Sda => wire.sda_pulled = pulled,
        }
        wire.settle();
    }
}

impl OutputPin for SimPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }
}

impl InputPin for SimPin {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        let wire = self.wire.borrow();
        Ok(match self.line {
            Line::Scl => wire.scl,
            Line::Sda => wire.sda,
        })
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Sums up all requested spin iterations.
#[derive(Clone, Default)]
pub struct CountingDelay {
    total: Rc<Cell<u64>>,
}

impl CountingDelay {
    pub fn total(&self) -> u64 {
        self.total.get()
    }
}

impl SpinDelay for CountingDelay {
    fn spin(&mut self, iterations: u32) {
        self.total.set(self.total.get() + u64::from(iterations));
    }
}

/// Display bus recording each transaction as (address, bytes).
#[derive(Default)]
pub struct RecordingBus {
    pub transactions: Vec<(u8, Vec<u8>)>,
    /// number of transactions to accept before failing
    pub fail_after: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refused;

impl RecordingBus {
    /// the command bytes of all single-command transactions, in order
    pub fn commands(&self) -> Vec<u8> {
        self.transactions
            .iter()
            .filter(|(_, bytes)| bytes.len() == 2 && bytes[0] == 0x80)
            .map(|(_, bytes)| bytes[1])
            .collect()
    }

    fn record(&mut self, address: u8, bytes: Vec<u8>) -> Result<(), Refused> {
        if self.fail_after == Some(self.transactions.len()) {
            return Err(Refused);
        }
        self.transactions.push((address, bytes));
        Ok(())
    }
}

impl DisplayBus for RecordingBus {
    type Error = Refused;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.record(address, bytes.to_vec())
    }

    fn write_register(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut all = Vec::with_capacity(bytes.len() + 1);
        all.push(register);
        all.extend_from_slice(bytes);
        self.record(address, all)
    }
}

/// Register file with a log of all writes.
#[derive(Default)]
pub struct RegisterFile {
    values: RefCell<BTreeMap<u32, u32>>,
    log: RefCell<Vec<(u32, u32)>>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<(u32, u32)> {
        self.log.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }
}

impl Registers for RegisterFile {
    fn read(&self, address: u32) -> u32 {
        self.values.borrow().get(&address).copied().unwrap_or(0)
    }

    fn write(&self, address: u32, value: u32) {
        self.values.borrow_mut().insert(address, value);
        self.log.borrow_mut().push((address, value));
    }
}
