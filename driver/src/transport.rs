use pmx_packet::constants::{MAX_FRAME, PREFIX_LENGTH, index};

/// A receive that ran out of time before the expected byte count arrived.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Incomplete {
    pub received: usize,
}

/// The three exchange shapes the protocol needs from a half-duplex line.
pub trait Transport {
    /// Sends `request`, then fills all of `response` or times out.
    fn round_trip_fixed(&mut self, request: &[u8], response: &mut [u8]) -> Result<(), Incomplete>;

    /// Sends `request`, reads the fixed prefix, then as many more bytes as the prefix declares.
    /// A short prefix reports nothing received; a short remainder reports just the prefix.
    fn round_trip_variable(
        &mut self,
        request: &[u8],
        response: &mut [u8; MAX_FRAME],
    ) -> Result<usize, Incomplete>;

    fn send_only(&mut self, request: &[u8]) -> bool;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    #[inline(always)]
    fn round_trip_fixed(&mut self, request: &[u8], response: &mut [u8]) -> Result<(), Incomplete> {
        T::round_trip_fixed(self, request, response)
    }

    #[inline(always)]
    fn round_trip_variable(
        &mut self,
        request: &[u8],
        response: &mut [u8; MAX_FRAME],
    ) -> Result<usize, Incomplete> {
        T::round_trip_variable(self, request, response)
    }

    #[inline(always)]
    fn send_only(&mut self, request: &[u8]) -> bool {
        T::send_only(self, request)
    }
}

/// A raw byte line. Direction control, flushing, and the receive deadline live behind this.
pub trait Port {
    type Error: core::fmt::Debug;

    /// Puts `bytes` on the wire and returns once the line is ready to receive.
    fn transmit(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Reads until `buffer` is full or the deadline passes; returns the count read.
    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Implements [`Transport`] over any [`Port`].
pub struct Link<P>(P);

impl<P: Port> Link<P> {
    #[inline(always)]
    pub const fn new(port: P) -> Self {
        Self(port)
    }

    #[inline(always)]
    pub const fn port(&self) -> &P {
        &self.0
    }

    #[inline(always)]
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.0
    }

    #[inline(always)]
    pub fn into_inner(self) -> P {
        self.0
    }

    #[inline]
    fn send(&mut self, request: &[u8]) -> bool {
        match self.0.transmit(request) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Couldn't transmit {} bytes: {e:?}", request.len());
                false
            }
        }
    }

    #[inline]
    fn receive(&mut self, buffer: &mut [u8]) -> usize {
        match self.0.receive(buffer) {
            Ok(n) => n.min(buffer.len()),
            Err(e) => {
                log::error!("Couldn't receive: {e:?}");
                0
            }
        }
    }
}

impl<P: Port> Transport for Link<P> {
    #[inline]
    fn round_trip_fixed(&mut self, request: &[u8], response: &mut [u8]) -> Result<(), Incomplete> {
        response.fill(0xFF);
        if !self.send(request) {
            return Err(Incomplete { received: 0 });
        }
        let received = self.receive(response);
        if received == response.len() {
            Ok(())
        } else {
            Err(Incomplete { received })
        }
    }

    #[inline]
    fn round_trip_variable(
        &mut self,
        request: &[u8],
        response: &mut [u8; MAX_FRAME],
    ) -> Result<usize, Incomplete> {
        response.fill(0xFF);
        if !self.send(request) {
            return Err(Incomplete { received: 0 });
        }
        if self.receive(&mut response[..PREFIX_LENGTH]) != PREFIX_LENGTH {
            return Err(Incomplete { received: 0 });
        }
        // A declared length shorter than the prefix is left for frame validation to reject.
        let total = usize::from(response[index::LENGTH]).max(PREFIX_LENGTH);
        if self.receive(&mut response[PREFIX_LENGTH..total]) != total - PREFIX_LENGTH {
            return Err(Incomplete {
                received: PREFIX_LENGTH,
            });
        }
        Ok(total)
    }

    #[inline]
    fn send_only(&mut self, request: &[u8]) -> bool {
        self.send(request)
    }
}

#[cfg(test)]
mod test {
    use {
        super::*,
        crate::test_util::ScriptedPort,
        quickcheck::TestResult,
        quickcheck_macros::quickcheck,
    };

    const REPLY: [u8; 10] = [0xFE, 0xFE, 0x01, 0x0A, 0x20, 0x00, 0x01, 0x02, 0xAA, 0xBB];

    #[test]
    fn variable_reads_declared_length() {
        let mut link = Link::new(ScriptedPort::new(&REPLY));
        let mut response = [0; MAX_FRAME];
        assert_eq!(link.round_trip_variable(&[0x01], &mut response), Ok(10));
        assert_eq!(response[..10], REPLY);
        assert_eq!(link.port().sent, [vec![0x01_u8]]);
    }

    #[test]
    fn variable_short_prefix() {
        let mut link = Link::new(ScriptedPort::new(&REPLY[..4]));
        let mut response = [0; MAX_FRAME];
        assert_eq!(
            link.round_trip_variable(&[0x01], &mut response),
            Err(Incomplete { received: 0 })
        );
    }

    #[test]
    fn variable_short_remainder() {
        let mut link = Link::new(ScriptedPort::new(&REPLY[..8]));
        let mut response = [0; MAX_FRAME];
        assert_eq!(
            link.round_trip_variable(&[0x01], &mut response),
            Err(Incomplete {
                received: PREFIX_LENGTH
            })
        );
    }

    #[quickcheck]
    fn variable_shortfall_is_zero_or_prefix(cut: usize) -> TestResult {
        let cut = cut % REPLY.len();
        let mut link = Link::new(ScriptedPort::new(&REPLY[..cut]));
        let mut response = [0; MAX_FRAME];
        let expected = if cut < PREFIX_LENGTH { 0 } else { PREFIX_LENGTH };
        TestResult::from_bool(
            link.round_trip_variable(&[0x01], &mut response)
                == Err(Incomplete { received: expected }),
        )
    }

    #[test]
    fn fixed_success_and_shortfall() {
        let mut link = Link::new(ScriptedPort::new(&REPLY));
        let mut response = [0; 10];
        assert_eq!(link.round_trip_fixed(&[0x01], &mut response), Ok(()));
        assert_eq!(response, REPLY);

        let mut link = Link::new(ScriptedPort::new(&REPLY[..3]));
        let mut response = [0; 10];
        assert_eq!(
            link.round_trip_fixed(&[0x01], &mut response),
            Err(Incomplete { received: 3 })
        );
        assert_eq!(response[3..], [0xFF_u8; 7]);
    }

    #[test]
    fn send_only_transmits_once() {
        let mut link = Link::new(ScriptedPort::new(&[]));
        assert!(link.send_only(&[0xFE, 0xFE]));
        assert_eq!(link.port().sent, [vec![0xFE_u8, 0xFE]]);
    }
}
