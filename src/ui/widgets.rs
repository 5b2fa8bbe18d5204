//! Child controls of the widget window
//!
//! The control set is declared as a widget table and pushed through the
//! grid layout placer; every control is then created at its resolved
//! client rectangle. All accessors run on the UI thread.

use crate::config::AppConfig;
use crate::domain::core::Rect;
use crate::domain::layout::{
    self, Anchor, Cell, Content, Fill, GridMetrics, LayoutError, Padding,
};
use crate::domain::timer::Direction;

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::Graphics::Gdi::{
    CreateFontW, DeleteObject, GetStockObject, InvalidateRect, CLIP_DEFAULT_PRECIS,
    DEFAULT_CHARSET, DEFAULT_GUI_FONT, DEFAULT_PITCH, DEFAULT_QUALITY, FF_DONTCARE, FW_BOLD,
    HFONT, HGDIOBJ, OUT_DEFAULT_PRECIS,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Controls::{TBM_GETPOS, TBM_SETPOS, TBM_SETRANGEMAX, TBM_SETRANGEMIN};
use windows::Win32::UI::Input::KeyboardAndMouse::EnableWindow;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, SendMessageW, SetWindowTextW, ShowWindow, BM_GETCHECK, BM_SETCHECK,
    BS_AUTOCHECKBOX, BS_PUSHBUTTON, SS_CENTER, SS_CENTERIMAGE, SW_HIDE, SW_SHOW, WINDOW_STYLE,
    WM_SETFONT, WS_CHILD, WS_VISIBLE,
};

/// The widgets of the timer application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetId {
    TimeLabel,
    MinutesSlider,
    CountDownToggle,
    SoundToggle,
    StartButton,
    ResetButton,
}

/// WM_COMMAND control ids
pub const ID_START_BUTTON: usize = 101;
pub const ID_RESET_BUTTON: usize = 102;
const ID_TIME_LABEL: usize = 110;
const ID_MINUTES_SLIDER: usize = 111;
const ID_COUNT_DOWN_TOGGLE: usize = 112;
const ID_SOUND_TOGGLE: usize = 113;
const ID_PASSIVE_BASE: usize = 120;

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("failed to create control {0:?}")]
    ControlCreationFailed(WidgetId),

    #[error("failed to create filler element")]
    FillerCreationFailed,

    #[error("failed to resolve module handle")]
    ModuleHandleFailed,

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// The widget table of the timer window: the time display and the minutes
/// slider span both columns, the toggles and action buttons share a row.
fn widget_table() -> Vec<Vec<Cell<WidgetId>>> {
    vec![
        vec![Cell::Widget(WidgetId::TimeLabel), Cell::Merge],
        vec![Cell::Widget(WidgetId::MinutesSlider), Cell::Merge],
        vec![
            Cell::Widget(WidgetId::CountDownToggle),
            Cell::Widget(WidgetId::SoundToggle),
        ],
        vec![
            Cell::Widget(WidgetId::StartButton),
            Cell::Widget(WidgetId::ResetButton),
        ],
    ]
}

/// Pixel metrics derived from the base sizing unit.
pub fn grid_metrics(base: i32) -> GridMetrics {
    GridMetrics {
        column_width: 9 * base,
        row_heights: vec![4 * base, 3 * base, 2 * base, 3 * base],
        columns: 2,
        fill: Fill::Stretch,
        anchor: Anchor::TopLeft,
    }
}

/// External padding mirrors the source layout: horizontal and vertical
/// cell padding of one base unit, no internal growth.
pub fn grid_padding(base: i32) -> Padding {
    Padding::new(base.clamp(0, u16::MAX as i32) as u16, base.clamp(0, u16::MAX as i32) as u16, 0, 0)
}

/// Client size of the whole widget block.
pub fn client_size(config: &AppConfig) -> (i32, i32) {
    grid_metrics(config.base_size).content_size(grid_padding(config.base_size))
}

struct PlacedControl {
    row: usize,
    hwnd: HWND,
}

/// Created controls plus the resolved geometry the window needs back
pub struct Widgets {
    controls: Vec<PlacedControl>,
    time_label: HWND,
    slider: HWND,
    count_down: HWND,
    sound: HWND,
    start: HWND,
    reset: HWND,
    time_label_rect: Rect,
    title_font: HFONT,
    secondary_hidden: bool,
}

impl Widgets {
    /// Creates all child controls inside `parent`.
    pub fn build(parent: HWND, config: &AppConfig) -> Result<Self, WidgetError> {
        let base = config.base_size;
        let padding = grid_padding(base);
        let metrics = grid_metrics(base);
        let placements = layout::place(&widget_table(), padding)?;

        let (client_w, client_h) = metrics.content_size(padding);
        let origin = metrics.origin_in(client_w, client_h, padding);

        let hinstance =
            unsafe { GetModuleHandleW(None) }.map_err(|_| WidgetError::ModuleHandleFailed)?;

        let title_font = unsafe {
            CreateFontW(
                -(5 * base / 2),
                0,
                0,
                0,
                FW_BOLD.0 as i32,
                0,
                0,
                0,
                DEFAULT_CHARSET.0 as u32,
                OUT_DEFAULT_PRECIS.0 as u32,
                CLIP_DEFAULT_PRECIS.0 as u32,
                DEFAULT_QUALITY.0 as u32,
                (DEFAULT_PITCH.0 | FF_DONTCARE.0) as u32,
                w!("Segoe UI"),
            )
        };
        let ui_font = HFONT(unsafe { GetStockObject(DEFAULT_GUI_FONT) }.0);

        let mut built = Self {
            controls: Vec::with_capacity(placements.len()),
            time_label: HWND(0),
            slider: HWND(0),
            count_down: HWND(0),
            sound: HWND(0),
            start: HWND(0),
            reset: HWND(0),
            time_label_rect: Rect::new(0, 0, 0, 0),
            title_font,
            secondary_hidden: false,
        };

        let mut passive_id = ID_PASSIVE_BASE;
        for placement in &placements {
            let rect = metrics.resolve(placement, origin);
            let hwnd = match placement.content {
                Content::Widget(id) => built.create_widget(parent, hinstance, id, rect, ui_font)?,
                Content::Filler(_) => {
                    passive_id += 1;
                    create_control(
                        parent,
                        hinstance,
                        w!("STATIC"),
                        w!(""),
                        WINDOW_STYLE(0),
                        rect,
                        passive_id,
                    )
                    .ok_or(WidgetError::FillerCreationFailed)?
                }
            };
            built.controls.push(PlacedControl {
                row: placement.row,
                hwnd,
            });
            if placement.content == Content::Widget(WidgetId::TimeLabel) {
                built.time_label_rect = rect;
            }
        }

        built.init_ranges(config);
        Ok(built)
    }

    fn create_widget(
        &mut self,
        parent: HWND,
        hinstance: windows::Win32::Foundation::HMODULE,
        id: WidgetId,
        rect: Rect,
        ui_font: HFONT,
    ) -> Result<HWND, WidgetError> {
        let (class, text, style, command_id, font) = match id {
            WidgetId::TimeLabel => (
                w!("STATIC"),
                w!("00:00"),
                WINDOW_STYLE((SS_CENTER | SS_CENTERIMAGE) as u32),
                ID_TIME_LABEL,
                self.title_font,
            ),
            WidgetId::MinutesSlider => (
                w!("msctls_trackbar32"),
                w!(""),
                WINDOW_STYLE(0),
                ID_MINUTES_SLIDER,
                ui_font,
            ),
            WidgetId::CountDownToggle => (
                w!("BUTTON"),
                w!("Count down"),
                WINDOW_STYLE(BS_AUTOCHECKBOX as u32),
                ID_COUNT_DOWN_TOGGLE,
                ui_font,
            ),
            WidgetId::SoundToggle => (
                w!("BUTTON"),
                w!("Sound"),
                WINDOW_STYLE(BS_AUTOCHECKBOX as u32),
                ID_SOUND_TOGGLE,
                ui_font,
            ),
            WidgetId::StartButton => (
                w!("BUTTON"),
                w!("Start F5"),
                WINDOW_STYLE(BS_PUSHBUTTON as u32),
                ID_START_BUTTON,
                ui_font,
            ),
            WidgetId::ResetButton => (
                w!("BUTTON"),
                w!("Reset F6"),
                WINDOW_STYLE(BS_PUSHBUTTON as u32),
                ID_RESET_BUTTON,
                ui_font,
            ),
        };

        let hwnd = create_control(parent, hinstance, class, text, style, rect, command_id)
            .ok_or(WidgetError::ControlCreationFailed(id))?;

        unsafe {
            SendMessageW(hwnd, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));
        }

        match id {
            WidgetId::TimeLabel => self.time_label = hwnd,
            WidgetId::MinutesSlider => self.slider = hwnd,
            WidgetId::CountDownToggle => self.count_down = hwnd,
            WidgetId::SoundToggle => self.sound = hwnd,
            WidgetId::StartButton => self.start = hwnd,
            WidgetId::ResetButton => self.reset = hwnd,
        }
        Ok(hwnd)
    }

    fn init_ranges(&self, config: &AppConfig) {
        unsafe {
            SendMessageW(
                self.slider,
                TBM_SETRANGEMIN,
                WPARAM(1),
                LPARAM(AppConfig::MIN_MINUTES as isize),
            );
            SendMessageW(
                self.slider,
                TBM_SETRANGEMAX,
                WPARAM(1),
                LPARAM(AppConfig::MAX_MINUTES as isize),
            );
            SendMessageW(
                self.slider,
                TBM_SETPOS,
                WPARAM(1),
                LPARAM(config.default_minutes as isize),
            );
            // counting down is the default mode
            SendMessageW(self.count_down, BM_SETCHECK, WPARAM(1), LPARAM(0));
        }
    }

    /// Slider position, already clamped to the legal minutes range.
    pub fn minutes(&self) -> u32 {
        let pos = unsafe { SendMessageW(self.slider, TBM_GETPOS, WPARAM(0), LPARAM(0)) };
        AppConfig::sanitize_minutes(pos.0.max(0) as u32)
    }

    pub fn direction(&self) -> Direction {
        let checked = unsafe { SendMessageW(self.count_down, BM_GETCHECK, WPARAM(0), LPARAM(0)) };
        if checked.0 == 1 {
            Direction::CountDown
        } else {
            Direction::CountUp
        }
    }

    pub fn sound_enabled(&self) -> bool {
        let checked = unsafe { SendMessageW(self.sound, BM_GETCHECK, WPARAM(0), LPARAM(0)) };
        checked.0 == 1
    }

    pub fn set_time_text(&self, text: &str) {
        let wide = super::to_wide(text);
        unsafe {
            let _ = SetWindowTextW(self.time_label, PCWSTR(wide.as_ptr()));
        }
    }

    /// Swaps the start button caption with the running state.
    pub fn set_start_caption(&self, running: bool) {
        let caption = if running { w!("Pause F5") } else { w!("Start F5") };
        unsafe {
            let _ = SetWindowTextW(self.start, caption);
        }
    }

    /// Enables or disables the slider and both toggles; the action buttons
    /// stay live in every state.
    pub fn set_inputs_enabled(&self, enabled: bool) {
        unsafe {
            let _ = EnableWindow(self.slider, enabled);
            let _ = EnableWindow(self.count_down, enabled);
            let _ = EnableWindow(self.sound, enabled);
        }
    }

    /// Hides every row below the time display. Idempotent.
    pub fn hide_secondary(&mut self) {
        if self.secondary_hidden {
            return;
        }
        for control in &self.controls {
            if control.row > 0 {
                unsafe {
                    let _ = ShowWindow(control.hwnd, SW_HIDE);
                }
            }
        }
        self.secondary_hidden = true;
    }

    /// Restores the rows hidden by [`Widgets::hide_secondary`]. Idempotent.
    pub fn show_secondary(&mut self) {
        if !self.secondary_hidden {
            return;
        }
        for control in &self.controls {
            if control.row > 0 {
                unsafe {
                    let _ = ShowWindow(control.hwnd, SW_SHOW);
                }
            }
        }
        self.secondary_hidden = false;
    }

    pub fn is_time_label(&self, hwnd: HWND) -> bool {
        hwnd == self.time_label
    }

    /// Client rectangle of the time display, used as the drag handle.
    pub fn time_label_rect(&self) -> Rect {
        self.time_label_rect
    }

    /// Forces the time display to repaint so a warning color change shows
    /// immediately instead of on the next text update.
    pub fn refresh_time_label(&self, parent: HWND) {
        unsafe {
            let _ = InvalidateRect(parent, None, true);
            let _ = InvalidateRect(self.time_label, None, true);
        }
    }
}

impl Drop for Widgets {
    fn drop(&mut self) {
        // Child windows die with their parent; the custom font does not.
        unsafe {
            let _ = DeleteObject(HGDIOBJ(self.title_font.0));
        }
    }
}

fn create_control(
    parent: HWND,
    hinstance: windows::Win32::Foundation::HMODULE,
    class: PCWSTR,
    text: PCWSTR,
    style: WINDOW_STYLE,
    rect: Rect,
    command_id: usize,
) -> Option<HWND> {
    let hwnd = unsafe {
        CreateWindowExW(
            Default::default(),
            class,
            text,
            WS_CHILD | WS_VISIBLE | style,
            rect.x,
            rect.y,
            rect.w,
            rect.h,
            parent,
            windows::Win32::UI::WindowsAndMessaging::HMENU(command_id as isize),
            hinstance,
            None,
        )
    };
    (hwnd.0 != 0).then_some(hwnd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_table_is_rectangular_with_expected_spans() {
        let placements = layout::place(&widget_table(), grid_padding(10)).unwrap();
        assert_eq!(placements.len(), 6);

        let time = &placements[0];
        assert_eq!(time.content, Content::Widget(WidgetId::TimeLabel));
        assert_eq!(time.column_span, 2);

        let slider = &placements[1];
        assert_eq!(slider.column_span, 2);

        // the two bottom rows hold two single-span controls each
        assert!(placements[2..].iter().all(|p| p.column_span == 1));
    }

    #[test]
    fn client_size_scales_with_base_unit() {
        let config = AppConfig::default();
        let (w, h) = client_size(&config);
        assert_eq!(w, 2 * (9 * 10 + 2 * 10));
        assert_eq!(h, (4 + 3 + 2 + 3) * 10 + 4 * 2 * 10);

        let larger = AppConfig {
            base_size: 20,
            ..AppConfig::default()
        };
        let (w2, h2) = client_size(&larger);
        assert_eq!(w2, 2 * w);
        assert_eq!(h2, 2 * h);
    }

    #[test]
    fn time_label_row_is_row_zero() {
        let placements = layout::place(&widget_table(), grid_padding(8)).unwrap();
        let time_row = placements
            .iter()
            .find(|p| p.content == Content::Widget(WidgetId::TimeLabel))
            .map(|p| p.row);
        assert_eq!(time_row, Some(0));
    }
}
