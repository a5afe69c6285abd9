use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use sill::common::log;
use sill::controller::{CreateRequest, NotificationReceiver, WindowController};
use sill::geometry::{Point, Rect, Size};
use sill::model::{Archetype, WindowId};
use sill::placement::{Anchor, ConstraintAdjustment, Positioner};
use sill::sys::headless::{HeadlessDisplays, HeadlessWindowSystem};
use sill::sys::window_server::{WindowEvent, WindowSystem};

/// Scripted demos of the window hierarchy against the in-memory window
/// system.
#[derive(Parser)]
struct Cli {
    /// Which scenario to run.
    #[arg(long, value_enum, default_value_t = Scenario::Tour)]
    scenario: Scenario,

    /// Dump the final window states as JSON in addition to the tree.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    /// Anchored popups closed by a foreign activation.
    Popups,
    /// A modal dialog disabling and re-enabling its owner.
    Dialog,
    /// Satellite visibility following the active subtree.
    Satellites,
    /// All of the above.
    Tour,
}

struct Demo {
    system: Arc<HeadlessWindowSystem>,
    controller: Arc<WindowController>,
    notifications: NotificationReceiver,
}

impl Demo {
    fn new() -> Self {
        let system = Arc::new(HeadlessWindowSystem::new());
        let displays = Arc::new(HeadlessDisplays::single(Rect::from_xywh(0, 0, 1280, 960)));
        let (controller, notifications) = WindowController::new(system.clone(), displays);
        Demo { system, controller, notifications }
    }

    fn create(
        &self,
        archetype: Archetype,
        size: (i32, i32),
        owner: Option<WindowId>,
        positioner: Option<Positioner>,
    ) -> Result<WindowId> {
        let metadata = self.controller.create_window(CreateRequest {
            archetype,
            size: Size::new(size.0, size.1),
            owner,
            positioner,
        })?;
        Ok(metadata.id)
    }

    fn activate(&self, id: WindowId) -> Result<()> {
        let handle = self
            .controller
            .handle_of(id)
            .ok_or_else(|| anyhow::anyhow!("{id} is not a live window"))?;
        self.system.send_event(handle, WindowEvent::Activated);
        Ok(())
    }

    fn print_tree(&self, caption: &str) {
        println!("--- {caption}");
        print!("{}", self.controller.render_tree());
    }

    fn finish(mut self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(&self.controller.window_info())?);
        }
        println!("--- notifications");
        while let Ok((_span, notification)) = self.notifications.try_recv() {
            println!("{}", serde_json::to_string(&notification)?);
        }
        Ok(())
    }
}

fn demo_popups(demo: &Demo) -> Result<()> {
    let owner = demo.create(Archetype::Regular, (400, 300), None, None)?;
    let positioner = Positioner {
        anchor_rect: Some(Rect::from_xywh(350, 0, 50, 50)),
        parent_anchor: Anchor::TopRight,
        child_anchor: Anchor::TopLeft,
        offset: Point::default(),
        constraint_adjustment: ConstraintAdjustment::FLIP_X | ConstraintAdjustment::SLIDE_X,
    };
    let popup = demo.create(Archetype::Popup, (160, 60), Some(owner), Some(positioner))?;
    let _nested = demo.create(Archetype::Popup, (120, 40), Some(popup), None)?;
    demo.print_tree("popup chain open");

    demo.activate(owner)?;
    demo.print_tree("after activating the owner (popups closed)");
    Ok(())
}

fn demo_dialog(demo: &Demo) -> Result<()> {
    let owner = demo.create(Archetype::Regular, (640, 480), None, None)?;
    let dialog = demo.create(Archetype::Dialog, (320, 200), Some(owner), None)?;
    demo.print_tree("dialog open, owner disabled");

    demo.controller.destroy_window(dialog);
    demo.print_tree("dialog closed, owner re-enabled");
    Ok(())
}

fn demo_satellites(demo: &Demo) -> Result<()> {
    let first = demo.create(Archetype::Regular, (400, 300), None, None)?;
    let _first_satellite = demo.create(Archetype::Satellite, (120, 240), Some(first), None)?;
    let second = demo.create(Archetype::Regular, (400, 300), None, None)?;
    let _second_satellite = demo.create(Archetype::Satellite, (120, 240), Some(second), None)?;
    demo.print_tree("two subtrees, second one active");

    demo.activate(first)?;
    demo.print_tree("first subtree activated");

    let handle = demo.controller.handle_of(first).expect("window is live");
    demo.system.send_event(handle, WindowEvent::AppActivationChanged(false));
    demo.print_tree("application deactivated, satellites hidden");
    Ok(())
}

fn run(name: &str, scenario: fn(&Demo) -> Result<()>, json: bool) -> Result<()> {
    println!("== {name} ==");
    let demo = Demo::new();
    scenario(&demo)?;
    demo.finish(json)
}

fn main() -> Result<()> {
    log::init();
    let cli = Cli::parse();

    match cli.scenario {
        Scenario::Popups => run("popups", demo_popups, cli.json)?,
        Scenario::Dialog => run("dialog", demo_dialog, cli.json)?,
        Scenario::Satellites => run("satellites", demo_satellites, cli.json)?,
        Scenario::Tour => {
            run("popups", demo_popups, cli.json)?;
            run("dialog", demo_dialog, cli.json)?;
            run("satellites", demo_satellites, cli.json)?;
        }
    }
    Ok(())
}
