#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_time::Timer;
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c},
    rtc_cntl::{Rtc, SocResetReason, reset_reason, wakeup_cause},
    system::{Cpu, SleepSource},
    time::Rate,
    timer::timg::TimerGroup,
};
use esp_radio::wifi::{ClientConfig, ModeConfig};
use log::{LevelFilter, info, warn};
use static_cell::StaticCell;
use wakealarm_core::{
    clock::zone_from_rule,
    controller::{ControllerConfig, ModeController},
    persist::{PersistentState, StateStore},
    sleep::SleepController,
    sync::{SyncConfig, SyncTransport, TimeSynchronizer},
    wake::WakeCause,
};
use wakealarm_hal_esp32::{
    clock::RtcClock,
    input::lines::ButtonLines,
    network::{ConnectivityHandle, ConnectivityState, WifiConfig},
    output::actuators::ActuatorLines,
    platform::display::CharDisplay,
    storage::retained::RetainedStateStore,
};

use board::FirmwareBoard;
use net_time::WifiSntpTransport;
use power::DeepSleep;

#[path = "main/board.rs"]
mod board;
#[path = "main/net_time.rs"]
mod net_time;
#[path = "main/power.rs"]
mod power;

const NTP_SERVER: &str = "1.us.pool.ntp.org";
const TZ_RULE: &str = "MST7MDT,M3.2.0,M11.1.0";
const LCD_I2C_KHZ: u32 = 100;
const DHCP_TIMEOUT_SECS: u64 = 15;
const NET_SEED: u64 = 0x5A17_2B34_D099_EE11;

const WIFI_SSID: &str = env!(
    "WAKEALARM_WIFI_SSID",
    "Set WAKEALARM_WIFI_SSID in your environment before building/flashing."
);
const WIFI_PASSWORD: &str = env!(
    "WAKEALARM_WIFI_PASSWORD",
    "Set WAKEALARM_WIFI_PASSWORD in your environment before building/flashing."
);
const WIFI_CONFIG: WifiConfig = WifiConfig::new(WIFI_SSID, WIFI_PASSWORD);

static CONNECTIVITY: ConnectivityHandle = ConnectivityHandle::new();
static NET_RESOURCES: StaticCell<embassy_net::StackResources<4>> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
esp_bootloader_esp_idf::esp_app_desc!();

/// Anything but a deep-sleep wake by timer or button counts as a reset.
fn wake_cause(reset: Option<SocResetReason>, source: SleepSource) -> WakeCause {
    if reset != Some(SocResetReason::CoreDeepSleep) {
        return WakeCause::Reset;
    }
    match source {
        SleepSource::Timer => WakeCause::TimerExpired,
        SleepSource::Ext0 | SleepSource::Ext1 | SleepSource::Gpio => WakeCause::GpioLevel,
        _ => WakeCause::Other,
    }
}

fn load_state(store: &mut RetainedStateStore) -> PersistentState {
    match store.load() {
        Ok(Some(state)) => state,
        Ok(None) => {
            info!("retained: no record; using defaults");
            PersistentState::cold_start()
        }
        Err(err) => {
            warn!("retained: record rejected ({:?}); using defaults", err);
            PersistentState::cold_start()
        }
    }
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: wakealarm starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    let boot_reset_reason = reset_reason(Cpu::ProCpu);
    let boot_wakeup_cause = wakeup_cause();
    let cause = wake_cause(boot_reset_reason, boot_wakeup_cause);
    info!(
        "boot reset_reason={:?} wakeup_cause={:?} cause={:?}",
        boot_reset_reason, boot_wakeup_cause, cause
    );

    // esp-radio requires an allocator.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let mut store = unsafe { RetainedStateStore::take() };
    let mut state = load_state(&mut store);

    // Needs the heap.
    let tz = zone_from_rule(TZ_RULE);

    // Buttons (active high, external pull-downs):
    // display=GPIO36 alarm=GPIO39 hour=GPIO34 tens=GPIO35 ones=GPIO32 off=GPIO33
    let input_cfg = InputConfig::default().with_pull(Pull::None);
    let buttons = ButtonLines::new([
        Input::new(peripherals.GPIO36, input_cfg),
        Input::new(peripherals.GPIO39, input_cfg),
        Input::new(peripherals.GPIO34, input_cfg),
        Input::new(peripherals.GPIO35, input_cfg),
        Input::new(peripherals.GPIO32, input_cfg),
        Input::new(peripherals.GPIO33, input_cfg),
    ]);

    // LED=GPIO2 motor_cw=GPIO19 motor_ccw=GPIO18 buzzer=GPIO5
    let actuators = ActuatorLines::new([
        Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default()),
        Output::new(peripherals.GPIO19, Level::Low, OutputConfig::default()),
        Output::new(peripherals.GPIO18, Level::Low, OutputConfig::default()),
        Output::new(peripherals.GPIO5, Level::Low, OutputConfig::default()),
    ]);

    let clock = RtcClock::new(Rtc::new(peripherals.LPWR));
    let net_seed = NET_SEED ^ clock.now_unix_micros();
    let board = FirmwareBoard::new(buttons, actuators, clock);

    // LCD backpack: SDA=GPIO21 SCL=GPIO22
    let i2c_config = I2cConfig::default().with_frequency(Rate::from_khz(LCD_I2C_KHZ));
    let i2c = match I2c::new(peripherals.I2C0, i2c_config) {
        Ok(i2c) => i2c
            .with_sda(peripherals.GPIO21)
            .with_scl(peripherals.GPIO22),
        Err(err) => {
            info!("i2c init failed: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };
    let display = CharDisplay::new(i2c, Delay::new());

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                loop {
                    Timer::after_secs(1).await;
                }
            }
        };

    let client_config = ClientConfig::default()
        .with_ssid(WIFI_CONFIG.ssid.into())
        .with_password(WIFI_CONFIG.password.into());
    let wifi_mode = ModeConfig::Client(client_config);
    if let Err(err) = wifi_controller.set_config(&wifi_mode) {
        info!("wifi mode config failed: {:?}", err);
        loop {
            Timer::after_secs(1).await;
        }
    }

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<4>::new()),
        net_seed,
    );

    let transport = WifiSntpTransport::new(&mut wifi_controller, stack, &CONNECTIVITY, NTP_SERVER);
    let synchronizer = TimeSynchronizer::new(transport, SyncConfig::default());
    let mut controller = ModeController::new(
        board,
        display,
        synchronizer,
        tz,
        ControllerConfig::default(),
    );

    info!(
        "cycle start: mode_before={} ntp={} tz={}",
        state.mode.as_str(),
        NTP_SERVER,
        TZ_RULE
    );

    let plan = match select(net_runner.run(), controller.run_cycle(cause, &mut state)).await {
        Either::First(_) => unreachable!(),
        Either::Second(plan) => plan,
    };

    let (board, _display, mut synchronizer) = controller.into_parts();
    let connectivity = CONNECTIVITY.snapshot();
    if connectivity.state != ConnectivityState::RadioOff {
        synchronizer.transport_mut().radio_off().await;
    }
    info!(
        "cycle done: join_failures={} sync={:?}",
        connectivity.join_failures,
        synchronizer.last_report()
    );

    SleepController::new(store, DeepSleep::new(board.shut_down())).sleep(plan, &state)
}
