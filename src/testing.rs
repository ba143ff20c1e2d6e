use embedded_hal_async::delay::DelayNs;

/// Delay that returns immediately and keeps a virtual clock.
#[derive(Debug, Default)]
pub struct VirtualDelay {
    calls: u32,
    elapsed_ns: u64,
}

impl VirtualDelay {
    pub fn calls(&self) -> u32 {
        self.calls
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }

    fn advance(&mut self, ns: u64) {
        self.calls += 1;
        self.elapsed_ns += ns;
    }
}

impl DelayNs for VirtualDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.advance(u64::from(ns));
    }

    async fn delay_us(&mut self, us: u32) {
        self.advance(u64::from(us) * 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms) * 1_000_000);
    }
}
