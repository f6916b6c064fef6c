//! Random byte source collaborator

/// Source of random bytes for challenges and IVs
pub trait RandomSource {
    /// Next random byte
    fn next_random_byte(&mut self) -> u8;

    /// Fill `buf` one byte at a time
    fn fill(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.next_random_byte();
        }
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_random_byte(&mut self) -> u8 {
        (**self).next_random_byte()
    }

    fn fill(&mut self, buf: &mut [u8]) {
        (**self).fill(buf)
    }
}

/// Random source backed by the thread-local CSPRNG
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

#[cfg(feature = "std")]
impl RandomSource for ThreadRandom {
    fn next_random_byte(&mut self) -> u8 {
        rand::random()
    }

    fn fill(&mut self, buf: &mut [u8]) {
        use rand::RngCore;
        rand::rng().fill_bytes(buf);
    }
}
