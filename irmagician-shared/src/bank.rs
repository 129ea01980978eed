//! Bank paging of device waveform memory.
//!
//! The device addresses its waveform memory in pages of [`PAGE_SIZE`]
//! samples. Sample commands carry only an offset within the selected page,
//! so walking a waveform means selecting each page once, right before its
//! first sample.

use crate::protocol::Command;

/// Samples per memory bank.
pub const PAGE_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct BankAddress {
    pub bank: usize,
    pub offset: usize,
}

impl BankAddress {
    pub fn of(index: usize) -> Self {
        BankAddress {
            bank: index / PAGE_SIZE,
            offset: index % PAGE_SIZE,
        }
    }
}

/// Decides when a bank-select has to precede a sample command.
///
/// Indices must be fed in increasing order.
#[derive(Debug, Default)]
pub struct BankPager {
    selected: Option<usize>,
}

impl BankPager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address `index`, returning the bank-select to issue first, if any.
    pub fn address(&mut self, index: usize) -> (BankAddress, Option<Command>) {
        let addr = BankAddress::of(index);
        debug_assert!(self.selected.map_or(true, |bank| bank <= addr.bank));

        if self.selected == Some(addr.bank) {
            return (addr, None);
        }

        self.selected = Some(addr.bank);
        (addr, Some(Command::BankSelect(addr.bank)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selects(count: usize) -> Vec<(usize, usize)> {
        let mut pager = BankPager::new();
        (0..count)
            .filter_map(|index| match pager.address(index) {
                (_, Some(Command::BankSelect(bank))) => Some((index, bank)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn address_split() {
        assert_eq!(BankAddress::of(0), BankAddress { bank: 0, offset: 0 });
        assert_eq!(BankAddress::of(63), BankAddress { bank: 0, offset: 63 });
        assert_eq!(BankAddress::of(64), BankAddress { bank: 1, offset: 0 });
        assert_eq!(BankAddress::of(130), BankAddress { bank: 2, offset: 2 });
    }

    #[test]
    fn one_select_per_page() {
        for count in [1, 63, 64, 65, 128, 130, 500].iter().copied() {
            let selects = selects(count);
            assert_eq!(selects.len(), (count + PAGE_SIZE - 1) / PAGE_SIZE, "count {}", count);
            assert_eq!(selects[0], (0, 0));
        }
    }

    #[test]
    fn selects_on_page_start() {
        assert_eq!(selects(130), vec![(0, 0), (64, 1), (128, 2)]);
    }

    #[test]
    fn no_select_for_empty_waveform() {
        assert!(selects(0).is_empty());
    }
}
