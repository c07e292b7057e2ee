use dear_dock::{
    AppShell, DockableWindow, LayoutCondition, MAIN_DOCK_SPACE, RunnerParams, Theme,
};
use dear_imgui_rs as imgui;
use dear_imgui_rs::{ConfigFlags, SplitDirection};
use std::sync::{Mutex, OnceLock};

fn test_guard() -> std::sync::MutexGuard<'static, ()> {
    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    GUARD
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

#[derive(Default)]
struct Counts {
    gui: u32,
    commands: u32,
    hidden: u32,
    status: u32,
    post_init: u32,
    exit: u32,
    quit_now: bool,
    theme: Option<Theme>,
}

fn params() -> RunnerParams<Counts> {
    RunnerParams::new("headless")
        .with_menu_bar(true)
        .with_status_bar(true)
        .with_split(MAIN_DOCK_SPACE, "BottomSpace", SplitDirection::Down, 0.25)
        .with_split(MAIN_DOCK_SPACE, "LeftSpace", SplitDirection::Left, 0.25)
        .with_window(DockableWindow::new("Commands", "LeftSpace", |ctx, c: &mut Counts| {
            c.commands += 1;
            ctx.ui().text("commands");
            if c.quit_now {
                ctx.request_exit();
            }
            if let Some(theme) = c.theme.take() {
                ctx.set_theme(theme);
            }
        }))
        .with_window(
            DockableWindow::new("Hidden", "BottomSpace", |_, c: &mut Counts| c.hidden += 1)
                .hidden(),
        )
        .on_show_gui(|_, c| c.gui += 1)
        .on_show_status(|ctx, c| {
            c.status += 1;
            ctx.ui().text("status");
        })
        .on_post_init(|c| c.post_init += 1)
        .on_before_exit(|c| c.exit += 1)
}

fn new_context(shell: &mut AppShell<Counts>, state: &mut Counts) -> imgui::Context {
    let mut ctx = imgui::Context::create();
    {
        let io = ctx.io_mut();
        io.set_display_size([1000.0, 800.0]);
        io.set_delta_time(1.0 / 60.0);
    }
    shell.setup_context(&mut ctx, state);
    let _ = ctx.font_atlas_mut().build();
    ctx
}

fn frame(ctx: &mut imgui::Context, shell: &mut AppShell<Counts>, state: &mut Counts) -> bool {
    let ui = ctx.frame();
    shell.frame(ui, None, state);
    let _ = ctx.render();
    shell.end_frame()
}

#[test]
fn callbacks_run_once_per_frame_and_hidden_windows_are_skipped() {
    let _guard = test_guard();
    let mut state = Counts::default();
    let mut shell = AppShell::new(params()).unwrap();
    let mut ctx = new_context(&mut shell, &mut state);
    shell.post_init(&mut state);

    for _ in 0..3 {
        assert!(!frame(&mut ctx, &mut shell, &mut state));
    }
    shell.before_exit(&mut state);

    assert_eq!(state.gui, 3);
    // a docked window may be skipped while its host node is created
    assert!((2..=3).contains(&state.commands), "{}", state.commands);
    assert_eq!(state.status, 3);
    assert_eq!(state.hidden, 0);
    assert_eq!((state.post_init, state.exit), (1, 1));
    assert_eq!(shell.dockable_windows().len(), 2);
}

#[test]
fn layout_is_written_once_then_on_reset() {
    let _guard = test_guard();
    let mut state = Counts::default();
    let mut shell = AppShell::new(params()).unwrap();
    let mut ctx = new_context(&mut shell, &mut state);

    frame(&mut ctx, &mut shell, &mut state);
    frame(&mut ctx, &mut shell, &mut state);
    assert_eq!(shell.layouts_applied(), 1);

    shell.request_layout_reset();
    frame(&mut ctx, &mut shell, &mut state);
    frame(&mut ctx, &mut shell, &mut state);
    assert_eq!(shell.layouts_applied(), 2);
}

#[test]
fn application_start_layout_is_forced_on_first_frame() {
    let _guard = test_guard();
    let mut state = Counts::default();
    let mut shell =
        AppShell::new(params().with_layout_condition(LayoutCondition::ApplicationStart)).unwrap();
    let mut ctx = new_context(&mut shell, &mut state);

    frame(&mut ctx, &mut shell, &mut state);
    frame(&mut ctx, &mut shell, &mut state);
    assert_eq!(shell.layouts_applied(), 1);
}

#[test]
fn exit_and_theme_requests_are_handled_after_the_frame() {
    let _guard = test_guard();
    let mut state = Counts::default();
    let mut shell = AppShell::new(params().with_theme(Theme::Dark)).unwrap();
    let mut ctx = new_context(&mut shell, &mut state);
    assert_eq!(shell.services().theme(), Some(Theme::Dark));

    state.theme = Some(Theme::Light);
    assert!(!frame(&mut ctx, &mut shell, &mut state));
    assert_eq!(shell.services().theme(), Some(Theme::Light));

    state.quit_now = true;
    assert!(frame(&mut ctx, &mut shell, &mut state));
    assert!(!shell.services().exit_requested());
}

#[test]
fn invalid_layout_is_rejected_before_any_frame() {
    let params = params().with_window(DockableWindow::new("Stray", "RightSpace", |_, _| {}));
    assert!(matches!(
        AppShell::new(params),
        Err(dear_dock::RunnerError::InvalidLayout(_))
    ));
}

#[test]
fn missing_image_draws_a_placeholder() {
    let _guard = test_guard();
    let mut state = Counts::default();
    let missing = std::env::temp_dir().join("dear-dock-headless-no-assets");
    let mut shell = AppShell::new(
        RunnerParams::new("images")
            .with_assets_folder(missing)
            .on_show_gui(|ctx, c: &mut Counts| {
                if !ctx.image_from_asset("images/none.png", [100.0, 100.0]) {
                    c.gui += 1;
                }
            }),
    )
    .unwrap();
    let mut ctx = new_context(&mut shell, &mut state);
    frame(&mut ctx, &mut shell, &mut state);
    frame(&mut ctx, &mut shell, &mut state);
    assert_eq!(state.gui, 2);
}

#[test]
fn viewports_are_requested_only_when_enabled() {
    let _guard = test_guard();
    let mut state = Counts::default();
    let mut shell = AppShell::new(params()).unwrap();
    let ctx = new_context(&mut shell, &mut state);
    assert!(ctx.io().config_flags().contains(ConfigFlags::DOCKING_ENABLE));
    assert!(!ctx.io().config_flags().contains(ConfigFlags::VIEWPORTS_ENABLE));
    drop(ctx);

    let mut shell = AppShell::new(params().with_viewports(true)).unwrap();
    assert!(shell.imgui_window().enable_viewports);
    let mut ctx = new_context(&mut shell, &mut state);
    assert_eq!(
        ctx.io().config_flags().contains(ConfigFlags::VIEWPORTS_ENABLE),
        cfg!(feature = "multi-viewport")
    );

    // without platform windows Dear ImGui keeps a single viewport
    frame(&mut ctx, &mut shell, &mut state);
    frame(&mut ctx, &mut shell, &mut state);
    assert!(!ctx.io().config_flags().contains(ConfigFlags::VIEWPORTS_ENABLE));
    assert_eq!(shell.layouts_applied(), 1);
}

#[test]
fn missing_font_files_are_errors() {
    let _guard = test_guard();
    let mut ctx = imgui::Context::create();
    let assets = dear_dock::Assets::new(Some(
        std::env::temp_dir().join("dear-dock-headless-no-assets"),
    ));
    assert!(dear_dock::fonts::load_font_ttf(&mut ctx, &assets, "fonts/none.ttf", 16.0).is_err());
    assert!(
        dear_dock::fonts::load_font_ttf_with_icons(&mut ctx, &assets, "fonts/none.ttf", 16.0)
            .is_err()
    );
}
