use image::GrayImage;
use tracing::debug;

use crate::{
    algorithms::chain::compress_runs,
    backend::ImageprocBackend,
    config::{ChainApprox, RetrievalMode, TraceOptions},
    contour::Contour,
    error::Result,
    hierarchy::Hierarchy,
    traits::{BorderKind, RawContour, VisionBackend},
};

/// Trace a binary image with the default backend.
///
/// An image without foreground gives an empty hierarchy.
pub fn find_contours(image: &GrayImage, options: &TraceOptions) -> Result<Hierarchy> {
    find_contours_with(&ImageprocBackend, image, options)
}

pub fn find_contours_with<B>(backend: &B, image: &GrayImage, options: &TraceOptions) -> Result<Hierarchy>
where
    B: VisionBackend + ?Sized,
{
    let raw = backend.trace(image)?;
    let hierarchy = assemble(raw, options);
    debug!(
        mode = %options.mode,
        method = %options.method,
        contours = hierarchy.len(),
        "assembled contour hierarchy"
    );
    Ok(hierarchy)
}

/// Apply the retrieval mode and chain storage to a raw border tree.
pub fn assemble(raw: Vec<RawContour>, options: &TraceOptions) -> Hierarchy {
    // Position of each kept raw border in the output, so parents can be remapped
    let mut remap: Vec<Option<usize>> = vec![None; raw.len()];
    let mut entries: Vec<(Contour, Option<usize>)> = Vec::new();

    for (i, border) in raw.iter().enumerate() {
        if border.points.is_empty() {
            continue;
        }
        let parent = match options.mode {
            RetrievalMode::External => {
                if border.kind != BorderKind::Outer || border.parent.is_some() {
                    continue;
                }
                None
            }
            RetrievalMode::List => None,
            RetrievalMode::CComp => match border.kind {
                BorderKind::Outer => None,
                BorderKind::Hole => border.parent.and_then(|p| remap.get(p).copied().flatten()),
            },
            RetrievalMode::Tree => border.parent.and_then(|p| remap.get(p).copied().flatten()),
        };

        let points = match options.method {
            ChainApprox::None => border.points.clone(),
            ChainApprox::Simple => compress_runs(&border.points),
        };

        remap[i] = Some(entries.len());
        entries.push((Contour::from_points(points), parent));
    }

    Hierarchy::from_parents(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point, Rect};
    use image::Luma;

    fn raw(points: &[(i32, i32)], parent: Option<usize>, kind: BorderKind) -> RawContour {
        RawContour {
            points: points.iter().copied().map(Point::from).collect(),
            parent,
            kind,
        }
    }

    // Outer 0 holds hole 1, which holds outer 2; outer 3 stands alone
    fn nested() -> Vec<RawContour> {
        vec![
            raw(&[(0, 0), (9, 0), (9, 9), (0, 9)], None, BorderKind::Outer),
            raw(&[(1, 1), (8, 1), (8, 8), (1, 8)], Some(0), BorderKind::Hole),
            raw(&[(3, 3), (5, 3), (5, 5), (3, 5)], Some(1), BorderKind::Outer),
            raw(&[(20, 0), (22, 0), (22, 2)], None, BorderKind::Outer),
        ]
    }

    fn opts(mode: RetrievalMode) -> TraceOptions {
        TraceOptions::new(mode, ChainApprox::None)
    }

    #[test]
    fn test_external_keeps_outermost() {
        let hierarchy = assemble(nested(), &opts(RetrievalMode::External));
        assert_eq!(hierarchy.len(), 2);
        assert!(hierarchy.iter().all(|c| c.parent().is_none() && c.child().is_none()));
    }

    #[test]
    fn test_list_is_flat() {
        let hierarchy = assemble(nested(), &opts(RetrievalMode::List));
        assert_eq!(hierarchy.roots().count(), 4);
    }

    #[test]
    fn test_ccomp_has_two_levels() {
        let hierarchy = assemble(nested(), &opts(RetrievalMode::CComp));
        assert_eq!(hierarchy.roots().count(), 3);
        assert!(hierarchy.iter().all(|c| c.depth() <= 1));
        let head = hierarchy.head().expect("Should have a head");
        assert_eq!(head.children().count(), 1);
    }

    #[test]
    fn test_tree_keeps_nesting() {
        let hierarchy = assemble(nested(), &opts(RetrievalMode::Tree));
        assert_eq!(hierarchy.roots().count(), 2);
        let depths: Vec<usize> = hierarchy.iter().map(|c| c.depth()).collect();
        assert_eq!(depths, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_empty_image_gives_empty_hierarchy() {
        let image = GrayImage::new(32, 32);
        let hierarchy = find_contours(&image, &TraceOptions::default()).expect("Should trace");
        assert!(hierarchy.is_empty());
        assert!(hierarchy.head().is_none());
    }

    #[test]
    fn test_square_trace() {
        let mut image = GrayImage::new(40, 40);
        for y in 10..20 {
            for x in 5..30 {
                image.put_pixel(x, y, Luma([255u8]));
            }
        }

        let simple = find_contours(&image, &TraceOptions::default()).expect("Should trace");
        let head = simple.head().expect("Should find the square");
        assert_eq!(head.rect(), Rect::new(5, 10, 25, 10));
        assert_eq!(head.len(), 4);

        let full = find_contours(&image, &opts(RetrievalMode::List)).expect("Should trace");
        let head = full.head().expect("Should find the square");
        assert_eq!(head.len(), 2 * (25 + 10) - 4);
    }
}
