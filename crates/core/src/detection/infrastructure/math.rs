//! Box overlap and suppression helpers for detector post-processing.

/// IoU between two bounding boxes represented as `[x1, y1, x2, y2]`.
pub fn bbox_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }

    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

/// Greedy NMS over `(corners, score)` pairs.
///
/// Returns indices of kept candidates, highest score first.
pub fn nms(candidates: &[([f64; 4], f64)], iou_thresh: f64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        candidates[b]
            .1
            .partial_cmp(&candidates[a].1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<usize> = Vec::new();
    for i in order {
        let overlaps = keep
            .iter()
            .any(|&k| bbox_iou(&candidates[k].0, &candidates[i].0) > iou_thresh);
        if !overlaps {
            keep.push(i);
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bbox_iou_no_overlap() {
        let a = [0.0, 0.0, 10.0, 10.0];
        let b = [20.0, 20.0, 30.0, 30.0];
        assert_eq!(bbox_iou(&a, &b), 0.0);
    }

    #[test]
    fn test_bbox_iou_perfect_overlap() {
        let a = [0.0, 0.0, 10.0, 10.0];
        assert_relative_eq!(bbox_iou(&a, &a), 1.0);
    }

    #[test]
    fn test_bbox_iou_partial_overlap() {
        let a = [0.0, 0.0, 10.0, 10.0];
        let b = [5.0, 5.0, 15.0, 15.0];
        assert_relative_eq!(bbox_iou(&a, &b), 25.0 / 175.0);
    }

    #[test]
    fn test_nms_suppresses_overlapping_lower_score() {
        let candidates = vec![
            ([0.0, 0.0, 100.0, 100.0], 0.8),
            ([5.0, 5.0, 105.0, 105.0], 0.9),
        ];
        assert_eq!(nms(&candidates, 0.3), vec![1]);
    }

    #[test]
    fn test_nms_keeps_disjoint_boxes_in_score_order() {
        let candidates = vec![
            ([0.0, 0.0, 50.0, 50.0], 0.6),
            ([200.0, 200.0, 250.0, 250.0], 0.9),
        ];
        assert_eq!(nms(&candidates, 0.3), vec![1, 0]);
    }

    #[test]
    fn test_nms_empty_input() {
        assert!(nms(&[], 0.3).is_empty());
    }
}
