use ndarray::{arr1, arr2, Array1, Array2};

pub struct MatrixHelper;

impl MatrixHelper {
    /// Rotation by `angle_deg` followed by a uniform `scale`, in y-down screen space.
    pub fn rotate_scale(angle_deg: f64, scale: f64) -> Array2<f64> {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        arr2(&[[cos * scale, -sin * scale], [sin * scale, cos * scale]])
    }

    /// Inverse of [`MatrixHelper::rotate_scale`]; a zero scale yields the zero matrix.
    pub fn inverse_rotate_scale(angle_deg: f64, scale: f64) -> Array2<f64> {
        if scale == 0.0 {
            return Array2::zeros((2, 2));
        }
        Self::rotate_scale(-angle_deg, 1.0 / scale)
    }

    pub fn apply(matrix: &Array2<f64>, x: f64, y: f64) -> (f64, f64) {
        let mapped: Array1<f64> = matrix.dot(&arr1(&[x, y]));
        (mapped[0], mapped[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_maps_x_axis_to_y_axis() {
        let m = MatrixHelper::rotate_scale(90.0, 2.0);
        let (x, y) = MatrixHelper::apply(&m, 1.0, 0.0);
        assert!(x.abs() < 1e-12);
        assert!((y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn inverse_undoes_forward_transform() {
        let forward = MatrixHelper::rotate_scale(33.0, 1.7);
        let inverse = MatrixHelper::inverse_rotate_scale(33.0, 1.7);
        let (x, y) = MatrixHelper::apply(&forward, 3.0, -5.0);
        let (bx, by) = MatrixHelper::apply(&inverse, x, y);
        assert!((bx - 3.0).abs() < 1e-9);
        assert!((by + 5.0).abs() < 1e-9);
    }
}
