use roadstream_common::SceneHost;

use crate::segment::Segment;

/// Road and scenery generation hooked onto freshly created segments.
///
/// Called synchronously right after the segment's tile grid is built and
/// before any constraint logic can observe it. Implementations attach what
/// they spawn to the segment so it is torn down with it.
pub trait DecorationGenerator {
    fn on_segment_created(&mut self, segment: &mut Segment, host: &mut dyn SceneHost);

    /// Label used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
