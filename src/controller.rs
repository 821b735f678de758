use crate::{
    device_client::DeviceTransport,
    error::{Result, ShutterError},
    relay_state::{parse_status, RelayStates},
    shutter::{Operation, RelayPort, ShutterId, MAX_SELECT_PRESSES, SHUTTER_PORTS},
};
use reqwest::StatusCode;
use tracing::*;

const STATUS_COMMAND: &str = "Status 8";

fn power_on_command(port: RelayPort) -> String {
    format!("Power{} ON", port)
}

/// A shutter counts as selected when its indicator is lit and the device is
/// not showing every indicator at once, which it does while switching.
pub fn is_selected(states: &RelayStates, shutter: ShutterId) -> bool {
    states.is_on(shutter.port()) && !states.all_on(&SHUTTER_PORTS)
}

pub struct ShutterController<T> {
    device: T,
}

impl<T: DeviceTransport> ShutterController<T> {
    pub fn new(device: T) -> Self {
        Self { device }
    }

    /// Current relay states, empty if the device could not be read
    pub fn led_states(&self) -> RelayStates {
        match self.read_led_states() {
            Ok(states) => states,
            Err(e) => {
                warn!("Failed to read relay states: {}", e);
                RelayStates::default()
            }
        }
    }

    fn read_led_states(&self) -> Result<RelayStates> {
        let response = self.device.perform_request(STATUS_COMMAND, None)?;
        if response.status != StatusCode::OK {
            return Err(ShutterError::HttpStatus(response.status));
        }
        parse_status(&response.body).map_err(|e| {
            debug!("Unparsable status payload {:?}", response.body);
            e
        })
    }

    /// Switch a relay on, the device turns it off again by itself
    pub fn push_button(&self, port: RelayPort) -> Result<()> {
        let response = self
            .device
            .perform_request(&power_on_command(port), None)?;
        if response.status != StatusCode::OK {
            return Err(ShutterError::HttpStatus(response.status));
        }
        Ok(())
    }

    /// Cycle the select button until `shutter` is selected
    ///
    /// Returns how many times the select button was pressed.
    #[instrument(skip(self))]
    pub fn select_shutter(&self, shutter: ShutterId) -> Result<usize> {
        let select_port = Operation::Select.port();
        let mut presses = 0;
        loop {
            let states = self.led_states();
            if is_selected(&states, shutter) {
                info!(presses, "shutter selected");
                return Ok(presses);
            }
            if presses >= MAX_SELECT_PRESSES {
                return Err(ShutterError::SelectionExhausted {
                    shutter: shutter.number(),
                    presses,
                });
            }
            debug!(?states, "shutter not selected yet, pressing select");
            self.push_button(select_port)?;
            presses += 1;
        }
    }

    pub fn execute(&self, operation: Operation, shutter: ShutterId) -> Result<()> {
        self.select_shutter(shutter)?;
        info!(?operation, %shutter, "sending operation");
        self.push_button(operation.port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_client::DeviceResponse;
    use std::cell::RefCell;

    /// Simulated shutter box lighting `script[n]` after `n` select presses
    struct FakeDevice {
        script: Vec<u8>,
        all_lit: bool,
        fail_select: bool,
        status_code: StatusCode,
        commands: RefCell<Vec<String>>,
    }

    impl FakeDevice {
        fn showing(selected: u8) -> Self {
            Self::scripted(vec![selected])
        }

        fn scripted(script: Vec<u8>) -> Self {
            Self {
                script,
                all_lit: false,
                fail_select: false,
                status_code: StatusCode::OK,
                commands: RefCell::new(vec![]),
            }
        }

        fn status_body(&self) -> String {
            let step = self.select_presses().min(self.script.len() - 1);
            let selected = self.script[step];
            let switches: Vec<String> = (1..=4)
                .map(|port| {
                    let lit = self.all_lit || port == selected;
                    format!(r#""Switch{}":"{}""#, port, if lit { "ON" } else { "OFF" })
                })
                .collect();
            format!(
                r#"{{"StatusSNS":{{"Time":"2020-11-02T19:53:04",{}}}}}"#,
                switches.join(",")
            )
        }

        fn commands(&self) -> Vec<String> {
            self.commands.borrow().clone()
        }

        fn select_presses(&self) -> usize {
            self.commands
                .borrow()
                .iter()
                .filter(|command| *command == "Power3 ON")
                .count()
        }
    }

    impl DeviceTransport for FakeDevice {
        fn perform_request(&self, command: &str, _body: Option<&str>) -> Result<DeviceResponse> {
            if command == STATUS_COMMAND {
                let body = self.status_body();
                self.commands.borrow_mut().push(command.to_owned());
                return Ok(DeviceResponse {
                    status: self.status_code,
                    body,
                });
            }
            self.commands.borrow_mut().push(command.to_owned());
            if command == "Power3 ON" && self.fail_select {
                return Ok(DeviceResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: String::new(),
                });
            }
            Ok(DeviceResponse {
                status: self.status_code,
                body: String::from("{}"),
            })
        }
    }

    fn shutter(number: u8) -> ShutterId {
        ShutterId::new(number).unwrap()
    }

    fn states(lit: &[u8]) -> RelayStates {
        (1..=4)
            .map(|port| (RelayPort(port), lit.contains(&port)))
            .collect()
    }

    #[test]
    fn selected_when_only_desired_port_is_lit() {
        assert!(is_selected(&states(&[2]), shutter(2)));
        assert!(!is_selected(&states(&[1]), shutter(2)));
        assert!(!is_selected(&RelayStates::default(), shutter(2)));
    }

    #[test]
    fn all_lit_is_never_selected() {
        for number in 1..=4 {
            assert!(!is_selected(&states(&[1, 2, 3, 4]), shutter(number)));
        }
    }

    #[test]
    fn three_lit_ports_still_select() {
        assert!(is_selected(&states(&[1, 2, 3]), shutter(3)));
    }

    #[test]
    fn led_states_reads_status() {
        let controller = ShutterController::new(FakeDevice::showing(3));
        assert_eq!(controller.led_states(), states(&[3]));
    }

    #[test]
    fn led_states_empty_on_failed_status() {
        let mut device = FakeDevice::showing(3);
        device.status_code = StatusCode::SERVICE_UNAVAILABLE;
        let controller = ShutterController::new(device);
        assert!(controller.led_states().is_empty());
    }

    #[test]
    fn push_button_fails_on_non_success_status() {
        let mut device = FakeDevice::showing(1);
        device.status_code = StatusCode::NOT_FOUND;
        let controller = ShutterController::new(device);
        assert!(matches!(
            controller.push_button(RelayPort(1)),
            Err(ShutterError::HttpStatus(status)) if status == StatusCode::NOT_FOUND
        ));
        assert_eq!(controller.device.commands(), vec!["Power1 ON"]);
    }

    #[test]
    fn selects_after_exactly_the_needed_presses() {
        for number in 1..=4u8 {
            let other = number % 4 + 1;
            for presses in 0..=MAX_SELECT_PRESSES {
                let mut script = vec![other; presses];
                script.push(number);
                let controller = ShutterController::new(FakeDevice::scripted(script));

                assert_eq!(controller.select_shutter(shutter(number)).unwrap(), presses);
                assert_eq!(controller.device.select_presses(), presses);
            }
        }
    }

    #[test]
    fn gives_up_after_bounded_presses() {
        for number in 1..=4 {
            let controller = ShutterController::new(FakeDevice::showing(0));

            let result = controller.select_shutter(shutter(number));
            assert!(matches!(
                result,
                Err(ShutterError::SelectionExhausted { presses: 8, .. })
            ));
            assert_eq!(controller.device.select_presses(), MAX_SELECT_PRESSES);
        }
    }

    #[test]
    fn stuck_all_lit_device_exhausts_selection() {
        let mut device = FakeDevice::showing(2);
        device.all_lit = true;
        let controller = ShutterController::new(device);

        assert!(controller.select_shutter(shutter(2)).is_err());
        assert_eq!(controller.device.select_presses(), MAX_SELECT_PRESSES);
    }

    #[test]
    fn failed_select_press_aborts() {
        let mut device = FakeDevice::showing(1);
        device.fail_select = true;
        let controller = ShutterController::new(device);

        assert!(matches!(
            controller.select_shutter(shutter(2)),
            Err(ShutterError::HttpStatus(status)) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert_eq!(controller.device.select_presses(), 1);
    }

    #[test]
    fn already_selected_shutter_only_sends_operation() {
        let controller = ShutterController::new(FakeDevice::showing(2));

        controller.execute(Operation::Up, shutter(2)).unwrap();

        assert_eq!(
            controller.device.commands(),
            vec![STATUS_COMMAND, "Power1 ON"]
        );
    }

    #[test]
    fn operation_follows_selection() {
        let controller = ShutterController::new(FakeDevice::scripted(vec![4, 1, 2]));

        controller.execute(Operation::Stop, shutter(2)).unwrap();

        assert_eq!(
            controller.device.commands(),
            vec![
                STATUS_COMMAND,
                "Power3 ON",
                STATUS_COMMAND,
                "Power3 ON",
                STATUS_COMMAND,
                "Power4 ON"
            ]
        );
    }

    #[test]
    fn operation_is_not_sent_when_selection_fails() {
        let controller = ShutterController::new(FakeDevice::showing(0));

        assert!(controller.execute(Operation::Down, shutter(1)).is_err());
        assert!(!controller
            .device
            .commands()
            .iter()
            .any(|command| command == "Power2 ON"));
    }
}
