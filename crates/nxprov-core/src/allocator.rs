// ── SVI address allocation ──

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

use crate::error::CoreError;

/// Hands out successive IPv4 interface addresses with a fixed prefix.
///
/// The cursor is advanced by `step` *before* each address is used, so a
/// base of `10.0.0.1` with step 4 yields `10.0.0.5`, `10.0.0.9`, ...
/// Allocation stops at the top of the address space instead of wrapping,
/// so no address is handed out twice.
#[derive(Debug, Clone)]
pub struct AddressAllocator {
    current: Ipv4Addr,
    step: u32,
    prefix_len: u8,
}

impl AddressAllocator {
    pub fn new(base: Ipv4Addr, step: u32, prefix_len: u8) -> Result<Self, CoreError> {
        if step == 0 {
            return Err(CoreError::ValidationFailed {
                message: "address step must be greater than zero".into(),
            });
        }
        if prefix_len > 32 {
            return Err(CoreError::ValidationFailed {
                message: format!("prefix length /{prefix_len} is longer than /32"),
            });
        }
        Ok(Self {
            current: base,
            step,
            prefix_len,
        })
    }

    /// The last address handed out (or the base, before the first call).
    pub fn current(&self) -> Ipv4Addr {
        self.current
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Advance the cursor and return the new address with the fixed prefix.
    pub fn allocate(&mut self) -> Result<Ipv4Net, CoreError> {
        let next = u32::from(self.current)
            .checked_add(self.step)
            .map(Ipv4Addr::from)
            .ok_or(CoreError::AddressSpaceExhausted { last: self.current })?;

        let net = Ipv4Net::new(next, self.prefix_len)
            .map_err(|e| CoreError::Internal(format!("invalid prefix: {e}")))?;
        self.current = next;
        Ok(net)
    }
}

impl Iterator for AddressAllocator {
    type Item = Ipv4Net;

    fn next(&mut self) -> Option<Self::Item> {
        self.allocate().ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn advances_before_use() {
        let mut alloc = AddressAllocator::new(Ipv4Addr::new(10, 0, 0, 1), 4, 30).unwrap();
        let got: Vec<String> = (0..4).map(|_| alloc.allocate().unwrap().to_string()).collect();
        assert_eq!(
            got,
            ["10.0.0.5/30", "10.0.0.9/30", "10.0.0.13/30", "10.0.0.17/30"]
        );
        assert_eq!(alloc.current(), Ipv4Addr::new(10, 0, 0, 17));
    }

    #[test]
    fn crosses_octet_boundary() {
        let mut alloc = AddressAllocator::new(Ipv4Addr::new(10, 0, 0, 253), 4, 30).unwrap();
        assert_eq!(alloc.allocate().unwrap().to_string(), "10.0.1.1/30");
    }

    #[test]
    fn ten_allocations_are_distinct() {
        let alloc = AddressAllocator::new(Ipv4Addr::new(10, 0, 0, 1), 4, 30).unwrap();
        let mut addrs: Vec<_> = alloc.take(10).map(|n| n.addr()).collect();
        addrs.sort();
        addrs.dedup();
        assert_eq!(addrs.len(), 10);
    }

    #[test]
    fn stops_at_top_of_address_space() {
        let mut alloc = AddressAllocator::new(Ipv4Addr::new(255, 255, 255, 250), 4, 30).unwrap();
        assert_eq!(alloc.allocate().unwrap().addr(), Ipv4Addr::new(255, 255, 255, 254));
        assert!(matches!(
            alloc.allocate(),
            Err(CoreError::AddressSpaceExhausted { .. })
        ));
        // Cursor stays put after exhaustion.
        assert_eq!(alloc.current(), Ipv4Addr::new(255, 255, 255, 254));
        assert!(alloc.next().is_none());
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(AddressAllocator::new(Ipv4Addr::new(10, 0, 0, 1), 0, 30).is_err());
        assert!(AddressAllocator::new(Ipv4Addr::new(10, 0, 0, 1), 4, 33).is_err());
    }
}
