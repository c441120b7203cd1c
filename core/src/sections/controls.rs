use crate::coord::{Point, UnitScale};
use crate::frame::Rgba;

pub const POSITION_LIMIT: f64 = 1.0e6;
pub const ANGLE_LIMIT: f64 = 180.0;

pub const SELECTED_ROW: Rgba = [200, 255, 200, 255];
pub const DESELECTED_ROW: Rgba = [255, 255, 255, 255];

/// Notifications raised by a control row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Changed,
    CheckBoxChanged,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlField {
    X,
    Y,
    Angle,
}

/// Bounded decimal field: values clamp to the range and round to `decimals` places.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinBox {
    minimum: f64,
    maximum: f64,
    value: f64,
    decimals: i32,
}

impl SpinBox {
    pub fn new(minimum: f64, maximum: f64, value: f64) -> Self {
        let mut spin_box = Self {
            minimum,
            maximum,
            value: 0.0,
            decimals: 2,
        };
        spin_box.set_value(value);
        spin_box
    }

    /// Returns `true` when the stored value changed.
    pub fn set_value(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let factor = 10f64.powi(self.decimals);
        let bounded = ((value * factor).round() / factor).clamp(self.minimum, self.maximum);
        if bounded == self.value {
            return false;
        }
        self.value = bounded;
        true
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }
}

/// Editable numeric row for one section: position X/Y, rotation and the
/// background-inclusion check box.
#[derive(Debug, Clone)]
pub struct SectionControls {
    x: SpinBox,
    y: SpinBox,
    angle: SpinBox,
    checked: bool,
    angle_step: f64,
    selected: bool,
    closed: bool,
    row: Option<RowId>,
}

/// Identifies a row's slot in the controls list layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowId(pub(crate) u64);

impl SectionControls {
    pub fn new(x_um: f64, y_um: f64, angle: f64, angle_step: f64) -> Self {
        Self {
            x: SpinBox::new(-POSITION_LIMIT, POSITION_LIMIT, x_um),
            y: SpinBox::new(-POSITION_LIMIT, POSITION_LIMIT, y_um),
            angle: SpinBox::new(-ANGLE_LIMIT, ANGLE_LIMIT, angle),
            checked: false,
            angle_step,
            selected: false,
            closed: false,
            row: None,
        }
    }

    pub fn row(&self) -> Option<RowId> {
        self.row
    }

    pub(crate) fn attach(&mut self, row: RowId) {
        self.row = Some(row);
        self.closed = false;
    }

    pub fn current_location(&self, scale: UnitScale) -> Point {
        Point::from_um(self.x.value(), self.y.value(), scale)
    }

    pub fn current_angle(&self) -> f64 {
        self.angle.value()
    }

    pub fn field(&self, field: ControlField) -> f64 {
        self.spin_box(field).value()
    }

    fn spin_box(&self, field: ControlField) -> &SpinBox {
        match field {
            ControlField::X => &self.x,
            ControlField::Y => &self.y,
            ControlField::Angle => &self.angle,
        }
    }

    fn spin_box_mut(&mut self, field: ControlField) -> &mut SpinBox {
        match field {
            ControlField::X => &mut self.x,
            ControlField::Y => &mut self.y,
            ControlField::Angle => &mut self.angle,
        }
    }

    pub fn set_field(&mut self, field: ControlField, value: f64) -> Option<ControlEvent> {
        self.spin_box_mut(field)
            .set_value(value)
            .then_some(ControlEvent::Changed)
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) -> Option<ControlEvent> {
        if self.checked == checked {
            return None;
        }
        self.checked = checked;
        Some(ControlEvent::CheckBoxChanged)
    }

    /// A field gaining focus, a click on the row or on the check box.
    pub fn focus(&self) -> ControlEvent {
        ControlEvent::Selected
    }

    /// Steps the angle by one `angle_step` in the sign of `direction`,
    /// carrying any overshoot past one bound to the other.
    pub fn increment_angle(&mut self, direction: f64) -> Option<ControlEvent> {
        let minimum = self.angle.minimum();
        let maximum = self.angle.maximum();
        let mut angle = self.angle.value();
        if direction > 0.0 {
            angle += self.angle_step;
            if angle > maximum {
                angle = minimum + (angle - maximum);
            }
        } else {
            angle -= self.angle_step;
            if angle < minimum {
                angle = maximum - (minimum - angle);
            }
        }
        self.set_field(ControlField::Angle, angle)
    }

    pub fn increment_x(&mut self, delta: f64) -> Option<ControlEvent> {
        self.set_field(ControlField::X, self.x.value() + delta)
    }

    pub fn increment_y(&mut self, delta: f64) -> Option<ControlEvent> {
        self.set_field(ControlField::Y, self.y.value() + delta)
    }

    pub fn select(&mut self) {
        self.selected = true;
    }

    pub fn deselect(&mut self) {
        self.selected = false;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn highlight(&self) -> Rgba {
        if self.selected {
            SELECTED_ROW
        } else {
            DESELECTED_ROW
        }
    }

    pub fn close(&mut self) {
        self.row = None;
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
