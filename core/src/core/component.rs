/// Anything the frame scheduler drives (input, video and sound chips).
pub trait Component {
    /// Called exactly once per frame boundary, after all bus and host
    /// activity for the ending frame has been processed.
    fn change_frame(&mut self);

    /// Console power reset. Only state owned by the console is cleared;
    /// state mirrored from host devices survives.
    fn reset(&mut self);
}
