//! The widget window
//!
//! A borderless, always-on-top, layered top-level window holding the
//! timer controls. The window procedure is the single writer of all timer
//! and widget state; the listener threads only post the app messages
//! defined here.

use std::time::Instant;

use crate::app::state::{Signal, SignalEvent, SignalMachine, Visibility, VisibilityChange};
use crate::config::AppConfig;
use crate::domain::core::{self, Rect};
use crate::domain::timer::{Tick, TimerEngine};
use crate::input::QuitChord;
use crate::platform::ScreenMetrics;
use crate::sound;
use crate::ui::widgets::{WidgetError, Widgets, ID_RESET_BUTTON, ID_START_BUTTON};

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    GetStockObject, SetBkMode, SetTextColor, HBRUSH, HDC, TRANSPARENT, WHITE_BRUSH,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Controls::{InitCommonControlsEx, ICC_BAR_CLASSES, INITCOMMONCONTROLSEX};
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetCursorPos, GetWindowLongPtrW,
    GetWindowRect, IsWindow, KillTimer, PostQuitMessage, RegisterClassW,
    SetLayeredWindowAttributes, SetTimer, SetWindowLongPtrW, SetWindowPos, ShowWindow,
    GWLP_USERDATA, LWA_ALPHA, SWP_NOACTIVATE, SWP_NOSIZE, SWP_NOZORDER, SW_SHOW, WM_APP,
    WM_COMMAND, WM_CTLCOLORSTATIC, WM_DESTROY, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE,
    WM_TIMER, WNDCLASSW, WS_EX_LAYERED, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

use crate::input::keyboard::{KEY_DOWN, KEY_UP, TAP_VK_ALT, TAP_VK_ESCAPE, TAP_VK_F4};

/// App messages posted by the listener threads
pub const MSG_START: u32 = WM_APP + 1;
pub const MSG_RESET: u32 = WM_APP + 2;
pub const MSG_POINTER: u32 = WM_APP + 3;
pub const MSG_KEY: u32 = WM_APP + 4;

const TICK_TIMER_ID: usize = 1;
const REFRESH_TIMER_ID: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("failed to register the widget window class")]
    ClassRegistrationFailed,

    #[error("failed to create the widget window")]
    WindowCreationFailed,

    #[error("failed to resolve module handle")]
    ModuleHandleFailed,

    #[error(transparent)]
    Widget(#[from] WidgetError),
}

/// Everything the window procedure touches, boxed behind GWLP_USERDATA
struct WindowState {
    config: AppConfig,
    widgets: Widgets,
    signal: Signal,
    engine: TimerEngine,
    chord: QuitChord,
    work_area: Rect,
    /// Whether the secondary rows are visible (pointer inside the window)
    visibility: Visibility,
    /// Warning styling currently applied to the time display
    warning: bool,
    /// Cursor offset from the window origin while dragging the time label
    drag_offset: Option<(i32, i32)>,
}

/// The widget window plus its boxed state
pub struct WidgetWindow {
    hwnd: HWND,
    state: *mut WindowState,
}

impl WidgetWindow {
    /// Registers the class, creates the window and its controls, places it
    /// centered at the top of the primary screen and shows it in the
    /// auto-hidden state.
    pub fn create(config: AppConfig, metrics: ScreenMetrics) -> Result<Self, WindowError> {
        let config = config.sanitized();
        let hinstance =
            unsafe { GetModuleHandleW(None) }.map_err(|_| WindowError::ModuleHandleFailed)?;

        let controls = INITCOMMONCONTROLSEX {
            dwSize: std::mem::size_of::<INITCOMMONCONTROLSEX>() as u32,
            dwICC: ICC_BAR_CLASSES,
        };
        unsafe {
            let _ = InitCommonControlsEx(&controls);
        }

        let class_name = w!("TempoWinWidgetWindow");
        let wc = WNDCLASSW {
            lpfnWndProc: Some(widget_wndproc),
            hInstance: hinstance.into(),
            lpszClassName: class_name,
            hbrBackground: HBRUSH(unsafe { GetStockObject(WHITE_BRUSH) }.0),
            ..Default::default()
        };
        // Zero means the class already exists; creation below is the check
        // that matters.
        let _ = unsafe { RegisterClassW(&wc) };

        let (client_w, client_h) = super::widgets::client_size(&config);
        let (x, y) = core::centered_top(metrics.screen, client_w);

        let title = super::to_wide(&config.title);
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_LAYERED,
                class_name,
                PCWSTR(title.as_ptr()),
                WS_POPUP,
                x,
                y,
                client_w,
                client_h,
                None,
                None,
                hinstance,
                None,
            )
        };
        if hwnd.0 == 0 {
            return Err(WindowError::WindowCreationFailed);
        }

        let widgets = Widgets::build(hwnd, &config).map_err(|e| {
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
            WindowError::from(e)
        })?;

        let mut engine = TimerEngine::new(config.warn_below_secs);
        engine.arm(config.default_minutes, widgets.direction());
        widgets.set_time_text(&TimerEngine::ready_display(config.default_minutes));

        let chord = QuitChord::new(std::time::Duration::from_millis(config.chord_window_ms));

        let state = Box::into_raw(Box::new(WindowState {
            widgets,
            signal: Signal::Ready,
            engine,
            chord,
            work_area: metrics.work_area,
            visibility: Visibility::default(),
            warning: false,
            drag_offset: None,
            config,
        }));

        unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, state as isize);

            // The widget starts in the auto-hidden state until the pointer
            // enters it, like a freshly placed desktop gadget.
            let _ = SetLayeredWindowAttributes(
                hwnd,
                COLORREF(0),
                (*state).config.hidden_alpha,
                LWA_ALPHA,
            );
            (*state).widgets.hide_secondary();

            let _ = ShowWindow(hwnd, SW_SHOW);
            SetTimer(hwnd, REFRESH_TIMER_ID, (*state).config.refresh_interval_ms, None);
        }

        log::info!(
            "widget window up at ({x}, {y}), {client_w}x{client_h}, topmost and layered"
        );

        Ok(Self { hwnd, state })
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }
}

impl Drop for WidgetWindow {
    fn drop(&mut self) {
        unsafe {
            if IsWindow(self.hwnd).as_bool() {
                SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
                let _ = DestroyWindow(self.hwnd);
            }
            drop(Box::from_raw(self.state));
        }
    }
}

impl WindowState {
    /// Start/pause toggle from the button, F5 or the start message.
    fn on_start(&mut self, hwnd: HWND) {
        let next = SignalMachine::process_event(self.signal, SignalEvent::StartPressed);
        match (self.signal, next) {
            (Signal::Ready, Signal::Running) | (Signal::Paused, Signal::Running) => {
                self.signal = next;
                self.widgets.set_start_caption(true);
                self.widgets.set_inputs_enabled(false);
                self.run_tick(hwnd);
                unsafe {
                    SetTimer(hwnd, TICK_TIMER_ID, self.config.tick_interval_ms, None);
                }
            }
            (Signal::Running, Signal::Paused) => {
                self.signal = next;
                unsafe {
                    let _ = KillTimer(hwnd, TICK_TIMER_ID);
                }
                self.widgets.set_start_caption(false);
            }
            _ => {}
        }
    }

    /// Reset from the button, F6, the reset message or counter expiry.
    fn on_reset(&mut self, hwnd: HWND) {
        unsafe {
            let _ = KillTimer(hwnd, TICK_TIMER_ID);
        }
        self.signal = SignalMachine::process_event(self.signal, SignalEvent::ResetPressed);
        self.widgets.set_start_caption(false);
        self.set_warning(hwnd, false);

        let minutes = self.widgets.minutes();
        self.engine.arm(minutes, self.widgets.direction());
        self.widgets.set_time_text(&TimerEngine::ready_display(minutes));
    }

    /// One second of timer progress.
    fn run_tick(&mut self, hwnd: HWND) {
        match self.engine.tick() {
            Tick::Display { text, warning } => {
                self.widgets.set_time_text(&text);
                self.set_warning(hwnd, warning);
                if warning && self.widgets.sound_enabled() {
                    sound::play_tick_alert();
                }
            }
            Tick::Finished => self.on_reset(hwnd),
        }
    }

    /// 100 ms ready-state refresh: follow the slider while ready, keep the
    /// inputs disabled otherwise.
    fn on_refresh(&mut self) {
        if self.signal.is_ready() {
            let minutes = self.widgets.minutes();
            self.engine.arm(minutes, self.widgets.direction());
            self.widgets.set_time_text(&TimerEngine::ready_display(minutes));
            self.widgets.set_inputs_enabled(true);
        } else {
            self.widgets.set_inputs_enabled(false);
        }
    }

    fn set_warning(&mut self, hwnd: HWND, warning: bool) {
        if self.warning != warning {
            self.warning = warning;
            self.widgets.refresh_time_label(hwnd);
        }
    }

    /// Pointer sample from the watcher thread, already on the UI thread.
    fn on_pointer(&mut self, hwnd: HWND, x: i32, y: i32) {
        let mut rect = windows::Win32::Foundation::RECT::default();
        if unsafe { GetWindowRect(hwnd, &mut rect) }.is_err() {
            return;
        }
        let window = Rect::new(rect.left, rect.top, rect.right - rect.left, rect.bottom - rect.top);

        match self.visibility.observe(window.contains_point(x, y)) {
            Some(VisibilityChange::Reveal) => {
                unsafe {
                    let _ = SetLayeredWindowAttributes(
                        hwnd,
                        COLORREF(0),
                        self.config.shown_alpha,
                        LWA_ALPHA,
                    );
                }
                self.widgets.show_secondary();
            }
            Some(VisibilityChange::Conceal) => {
                unsafe {
                    let _ = SetLayeredWindowAttributes(
                        hwnd,
                        COLORREF(0),
                        self.config.hidden_alpha,
                        LWA_ALPHA,
                    );
                }
                self.widgets.hide_secondary();
            }
            None => {}
        }
    }

    /// Key observation from the tap thread. Returns true when the quit
    /// gesture completed.
    fn on_key(&mut self, vk: usize, transition: isize) -> bool {
        let now = Instant::now();
        let shown = self.visibility.is_shown();
        match (vk, transition) {
            (v, t) if v == TAP_VK_ALT && t == KEY_DOWN => {
                if shown {
                    self.chord.arm(now);
                }
                false
            }
            (v, t) if v == TAP_VK_F4 && t == KEY_DOWN => shown && self.chord.completes(now),
            (v, t) if v == TAP_VK_ESCAPE && t == KEY_UP => shown,
            _ => false,
        }
    }

    fn begin_drag(&mut self, hwnd: HWND, client_x: i32, client_y: i32) {
        if !self.widgets.time_label_rect().contains_point(client_x, client_y) {
            return;
        }
        let mut cursor = POINT::default();
        let mut rect = windows::Win32::Foundation::RECT::default();
        unsafe {
            if GetCursorPos(&mut cursor).is_err() || GetWindowRect(hwnd, &mut rect).is_err() {
                return;
            }
            SetCapture(hwnd);
        }
        self.drag_offset = Some((cursor.x - rect.left, cursor.y - rect.top));
    }

    fn drag_to_cursor(&mut self, hwnd: HWND) {
        let Some((dx, dy)) = self.drag_offset else {
            return;
        };
        let mut cursor = POINT::default();
        let mut rect = windows::Win32::Foundation::RECT::default();
        unsafe {
            if GetCursorPos(&mut cursor).is_err() || GetWindowRect(hwnd, &mut rect).is_err() {
                return;
            }
        }
        let (w, h) = (rect.right - rect.left, rect.bottom - rect.top);
        let (x, y) = core::clamp_to_area(self.work_area, w, h, cursor.x - dx, cursor.y - dy);
        unsafe {
            let _ = SetWindowPos(
                hwnd,
                HWND(0),
                x,
                y,
                0,
                0,
                SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            );
        }
    }

    fn end_drag(&mut self) {
        if self.drag_offset.take().is_some() {
            unsafe {
                let _ = ReleaseCapture();
            }
        }
    }
}

unsafe extern "system" fn widget_wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut WindowState;
    if ptr.is_null() {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }
    let state = &mut *ptr;

    match msg {
        MSG_START => {
            state.on_start(hwnd);
            LRESULT(0)
        }
        MSG_RESET => {
            state.on_reset(hwnd);
            LRESULT(0)
        }
        MSG_POINTER => {
            let x = wparam.0 as u32 as i32;
            let y = lparam.0 as i32;
            state.on_pointer(hwnd, x, y);
            LRESULT(0)
        }
        MSG_KEY => {
            if state.on_key(wparam.0, lparam.0) {
                log::info!("quit gesture, closing");
                let _ = DestroyWindow(hwnd);
            }
            LRESULT(0)
        }
        WM_TIMER => {
            match wparam.0 {
                TICK_TIMER_ID => state.run_tick(hwnd),
                REFRESH_TIMER_ID => state.on_refresh(),
                _ => {}
            }
            LRESULT(0)
        }
        WM_COMMAND => {
            match wparam.0 & 0xFFFF {
                ID_START_BUTTON => state.on_start(hwnd),
                ID_RESET_BUTTON => state.on_reset(hwnd),
                _ => {}
            }
            LRESULT(0)
        }
        WM_CTLCOLORSTATIC => {
            let control = HWND(lparam.0);
            if state.widgets.is_time_label(control) {
                let hdc = HDC(wparam.0 as isize);
                let color = if state.warning {
                    COLORREF(0x0000_00FF) // red, BGR
                } else {
                    COLORREF(0x0000_0000)
                };
                SetTextColor(hdc, color);
                SetBkMode(hdc, TRANSPARENT);
                return LRESULT(GetStockObject(WHITE_BRUSH).0);
            }
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }
        WM_LBUTTONDOWN => {
            let x = (lparam.0 & 0xFFFF) as u16 as i16 as i32;
            let y = ((lparam.0 >> 16) & 0xFFFF) as u16 as i16 as i32;
            state.begin_drag(hwnd, x, y);
            LRESULT(0)
        }
        WM_MOUSEMOVE => {
            state.drag_to_cursor(hwnd);
            LRESULT(0)
        }
        WM_LBUTTONUP => {
            state.end_drag();
            LRESULT(0)
        }
        WM_DESTROY => {
            let _ = KillTimer(hwnd, TICK_TIMER_ID);
            let _ = KillTimer(hwnd, REFRESH_TIMER_ID);
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
