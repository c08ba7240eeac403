//! InputSource port.

/// Source of raw line samples, one 16-bit bitset per bank.
///
/// A polled source is always pending. An interrupt-fed source reports
/// pending only after its interrupt fired; the controller then samples every
/// bank and calls [`acknowledge`](Self::acknowledge) once the resulting
/// events are written, so an interrupt raised meanwhile is not lost.
///
/// # Examples
///
/// ```ignore
/// struct Expanders<I2C> { i2c: I2C }
///
/// impl<I2C: I2c> InputSource for Expanders<I2C> {
///     type Error = I2C::Error;
///
///     async fn read_bank(&mut self, bank: u8) -> Result<u16, Self::Error> {
///         let mut buf = [0u8; 2];
///         self.i2c.write_read(0x20 + bank, &[GPIOA], &mut buf).await?;
///         Ok(u16::from_le_bytes(buf))
///     }
/// }
/// ```
pub trait InputSource {
    /// Error reported by the expander bus.
    type Error: core::fmt::Debug;

    /// Sample all lines of `bank`. Bit `n` is pin `n`; a set bit means on.
    async fn read_bank(&mut self, bank: u8) -> Result<u16, Self::Error>;

    /// Whether new samples may be available.
    fn pending(&mut self) -> bool {
        true
    }

    /// The samples taken since the last [`pending`](Self::pending) are handled.
    fn acknowledge(&mut self) {}
}
