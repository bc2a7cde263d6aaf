/// Errors raised while wiring up the streaming subsystem.
///
/// Nothing in the per-tick path returns an error; these only come out of
/// construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    #[error(
        "segment length mismatch: controller is configured for {configured}, \
         but the tile grid spans {grid_extent} along the travel axis"
    )]
    SegmentLengthMismatch { configured: f32, grid_extent: f32 },
}
