use super::word::Word;

/// A device that decodes a block of local port numbers on the console bus.
///
/// The bus core translates global port addresses to device-local numbers
/// before calling in. A failed access (`None` / `false`) is an unanswered
/// bus cycle: the address was not decoded, nothing changed, and the caller
/// decides what an unanswered cycle means for the CPU.
pub trait PortDevice {
    /// Number of local ports this device decodes (`0..port_count()`).
    fn port_count(&self) -> u32;

    /// Read a local port. Returns `None` if the port is not decoded.
    fn read_port(&mut self, local_port: u32) -> Option<Word>;

    /// Write a local port. Returns `false` if the write strobe was not
    /// decoded. A decoded write may still ignore an illegal value.
    fn write_port(&mut self, local_port: u32, value: Word) -> bool;
}
