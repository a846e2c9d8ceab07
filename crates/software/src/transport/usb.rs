//! A [`Transport`] which speaks USB-MIDI Event Packets, used as the surface's fallback interface.
//!
//! USB-MIDI frames every MIDI message in one or more 32-bit packets. The zeroth byte is the Packet Header: the cable
//! number in the high nibble and the Code Index Number (CIN) in the low nibble. The CIN says how many of the three
//! remaining bytes are meaningful and, for System Exclusive, whether the packet starts, continues or ends a message.

use super::{ChannelMessage, Event, SYSEX_END, SYSEX_START, Transport};
use embassy_sync::{blocking_mutex::raw::NoopRawMutex, channel::Channel};
use tinyvec::ArrayVec;
use wmidi::MidiMessage;

/// One USB-MIDI Event Packet.
pub type Packet = [u8; 4];

/// Default number of packets buffered in each direction.
pub const DEFAULT_QUEUE_LEN: usize = 32;

/// Default capacity, in bytes, for a single System Exclusive message.
pub const DEFAULT_SYSEX_LEN: usize = 128;

/// CIN: SysEx starts or continues; three bytes follow.
const CIN_SYSEX_CONTINUE: u8 = 0x4;
/// CIN: single-byte System Common message, or SysEx ends with the following single byte.
const CIN_SYSEX_END_1: u8 = 0x5;
/// CIN: SysEx ends with the following two bytes.
const CIN_SYSEX_END_2: u8 = 0x6;
/// CIN: SysEx ends with the following three bytes.
const CIN_SYSEX_END_3: u8 = 0x7;

enum Decoded {
    ChannelMessage(ChannelMessage),
    SystemExclusive,
}

/// A [`Transport`] over queues of USB-MIDI Event Packets.
///
/// The USB side of the firmware hands received bytes to [`receive()`](Self::receive) and drains
/// [`take_outbound()`](Self::take_outbound) into its IN endpoint; the surface polls [`read()`](Transport::read) once
/// per cycle. Both queues are bounded at `Q` packets and a System Exclusive message may be at most `S` bytes long.
/// Anything that doesn't fit is dropped.
pub struct UsbMidiTransport<const Q: usize = DEFAULT_QUEUE_LEN, const S: usize = DEFAULT_SYSEX_LEN> {
    inbound: Channel<NoopRawMutex, Packet, Q>,
    outbound: Channel<NoopRawMutex, Packet, Q>,
    sysex: ArrayVec<[u8; S]>,
    /// A SysEx message has been started but not yet terminated.
    in_sysex: bool,
    /// The SysEx in progress outgrew the buffer and will be discarded when it ends.
    sysex_overflow: bool,
    /// `sysex` holds a message already handed out by `read()`.
    sysex_complete: bool,
}

impl<const Q: usize, const S: usize> Default for UsbMidiTransport<Q, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const Q: usize, const S: usize> UsbMidiTransport<Q, S> {
    /// Construct an idle [`UsbMidiTransport`] with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Channel::new(),
            outbound: Channel::new(),
            sysex: ArrayVec::new(),
            in_sysex: false,
            sysex_overflow: false,
            sysex_complete: false,
        }
    }

    /// Queue data assumed to be USB-MIDI Event Packets, as read from the OUT endpoint.
    ///
    /// Returns the number of packets accepted. Packets which arrive while the queue is full are lost.
    pub fn receive(&self, data: &[u8]) -> usize {
        let mut accepted = 0;
        for potential_packet in data.chunks(4) {
            let Ok(packet) = Packet::try_from(potential_packet) else {
                error!("USB-MIDI Event Packets must always be 32 bits long");
                continue;
            };
            if self.inbound.try_send(packet).is_err() {
                warn!("USB-MIDI inbound queue is full, dropping packet {:x}", packet);
                continue;
            }
            accepted += 1;
        }
        accepted
    }

    /// Take the next packet waiting to be written to the IN endpoint, if any.
    pub fn take_outbound(&self) -> Option<Packet> {
        self.outbound.try_receive().ok()
    }

    /// The number of packets waiting to be read by the surface.
    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    fn reset_sysex(&mut self) {
        self.sysex.clear();
        self.in_sysex = false;
        self.sysex_overflow = false;
        self.sysex_complete = false;
    }

    fn decode(&mut self, packet: Packet) -> Option<Decoded> {
        let [header, status, data1, data2] = packet;
        let cin = header & 0x0F;
        match cin {
            0x8..=0xB | 0xE => Some(Decoded::ChannelMessage(ChannelMessage::new(
                status, data1, data2,
            ))),
            // Program Change and Channel Pressure only carry one data byte
            0xC | 0xD => Some(Decoded::ChannelMessage(ChannelMessage::new(status, data1, 0))),
            CIN_SYSEX_CONTINUE | CIN_SYSEX_END_1 | CIN_SYSEX_END_2 | CIN_SYSEX_END_3 => {
                let len = match cin {
                    CIN_SYSEX_END_1 => 1,
                    CIN_SYSEX_END_2 => 2,
                    _ => 3,
                };
                self.decode_sysex(cin, &packet[1..=len])
            }
            // reserved, System Common and single-byte (real-time) packets aren't of interest
            _ => None,
        }
    }

    fn decode_sysex(&mut self, cin: u8, bytes: &[u8]) -> Option<Decoded> {
        if bytes.first() == Some(&SYSEX_START) {
            self.reset_sysex();
            self.in_sysex = true;
        }
        // a lone CIN 0x5 outside of SysEx is a System Common message; anything else is a stray fragment
        if !self.in_sysex {
            return None;
        }

        for &byte in bytes {
            if self.sysex.try_push(byte).is_some() {
                self.sysex_overflow = true;
            }
        }

        if cin == CIN_SYSEX_CONTINUE {
            return None;
        }

        self.in_sysex = false;
        if self.sysex_overflow || bytes.last() != Some(&SYSEX_END) {
            warn!(
                "Discarding System Exclusive message (overflow: {}, terminated: {})",
                self.sysex_overflow,
                bytes.last() == Some(&SYSEX_END)
            );
            self.reset_sysex();
            return None;
        }
        self.sysex_complete = true;
        Some(Decoded::SystemExclusive)
    }
}

impl<const Q: usize, const S: usize> Transport for UsbMidiTransport<Q, S> {
    fn begin(&mut self) {
        self.inbound.clear();
        self.outbound.clear();
        self.reset_sysex();
    }

    fn read(&mut self) -> Event<'_> {
        if self.sysex_complete {
            self.reset_sysex();
        }
        while let Ok(packet) = self.inbound.try_receive() {
            match self.decode(packet) {
                Some(Decoded::ChannelMessage(message)) => return Event::ChannelMessage(message),
                Some(Decoded::SystemExclusive) => return Event::SystemExclusive(self.sysex.as_slice()),
                None => {}
            }
        }
        Event::None
    }

    fn ignore_input(&mut self) {
        self.inbound.clear();
        self.reset_sysex();
    }

    fn send(&mut self, message: &MidiMessage<'_>) {
        let mut bytes = [0_u8; 3];
        match message.copy_to_slice(&mut bytes) {
            // channel voice messages only; the CIN of each matches its message type and the cable is always 0
            Ok(_) if (0x80..SYSEX_START).contains(&bytes[0]) => {
                let packet = [bytes[0] >> 4, bytes[0], bytes[1], bytes[2]];
                if self.outbound.try_send(packet).is_err() {
                    warn!("USB-MIDI outbound queue is full, dropping {:x}", bytes);
                }
            }
            _ => warn!("Only channel voice messages can be sent over USB-MIDI"),
        }
    }
}
