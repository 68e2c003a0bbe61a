//! `set_tone_list` and `get_tone_list`.
//!
//! The channel cache is written before the waveform is pushed to hardware, so
//! a later `get_tone_list` reports the last requested tones even when the
//! upload failed.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::channels::{Channel, ChannelStore, ToneConfig};
use crate::dispatch::Envelope;
use crate::driver::{DriverError, HardwareDriver};

use super::params::{FieldError, integer, require};
use super::{HandlerError, respond};

/// Failure inside the waveform upload sequence.
#[derive(Debug, Error)]
pub enum WaveformError {
    /// The channel is not one the board has.
    #[error("channel {0} is not supported")]
    UnsupportedChannel(i64),
    /// A tone or amplitude entry was not a number.
    #[error("{field} must be a list of numbers")]
    NonNumeric {
        /// Offending field.
        field: &'static str,
    },
    /// Tone and amplitude lists differ in length.
    #[error("{tones} tones but {amplitudes} amplitudes")]
    LengthMismatch {
        /// Number of tones.
        tones: usize,
        /// Number of amplitudes.
        amplitudes: usize,
    },
    /// The driver rejected a step.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Records and uploads a tone list for one channel.
pub fn set_tone_list<D: HardwareDriver>(
    driver: &mut D,
    channels: &mut ChannelStore,
    uuid: &str,
    data: Map<String, Value>,
) -> Envelope {
    respond("set_tone_list", uuid, apply_set(driver, channels, data))
}

fn apply_set<D: HardwareDriver>(
    driver: &mut D,
    channels: &mut ChannelStore,
    mut data: Map<String, Value>,
) -> Result<Map<String, Value>, HandlerError> {
    let tone_list = take_tone_field(&mut data, "tone_list")?;
    let channel = require(&data, "channel").map_err(HandlerError::MissingToneParameters)?;
    let channel = integer("channel", channel)?;
    let amplitudes = take_tone_field(&mut data, "amplitudes")?;

    let tones = numbers("tone_list", &tone_list);
    let levels = numbers("amplitudes", &amplitudes);
    if let Some(slot) = Channel::from_number(channel) {
        channels.record(slot, ToneConfig::new(tone_list, amplitudes));
    }

    let tones = tones.map_err(HandlerError::WaveformUpload)?;
    let levels = levels.map_err(HandlerError::WaveformUpload)?;
    upload_waveform(driver, channel, &tones, &levels).map_err(HandlerError::WaveformUpload)?;
    Ok(Map::new())
}

fn take_tone_field(
    data: &mut Map<String, Value>,
    field: &'static str,
) -> Result<Value, HandlerError> {
    data.remove(field)
        .ok_or(HandlerError::MissingToneParameters(FieldError::Missing(field)))
}

fn numbers(field: &'static str, value: &Value) -> Result<Vec<f64>, WaveformError> {
    let non_numeric = || WaveformError::NonNumeric { field };
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_f64().ok_or_else(non_numeric))
            .collect(),
        Value::Number(number) => number
            .as_f64()
            .map(|single| vec![single])
            .ok_or_else(non_numeric),
        _ => Err(non_numeric()),
    }
}

fn upload_waveform<D: HardwareDriver>(
    driver: &mut D,
    channel: i64,
    tones: &[f64],
    amplitudes: &[f64],
) -> Result<(), WaveformError> {
    if tones.len() != amplitudes.len() {
        return Err(WaveformError::LengthMismatch {
            tones: tones.len(),
            amplitudes: amplitudes.len(),
        });
    }
    let channel =
        Channel::from_number(channel).ok_or(WaveformError::UnsupportedChannel(channel))?;

    let waveform = driver.generate_waveform(tones, amplitudes)?;
    driver.load_bin_list(channel, &waveform.frequencies)?;
    let normalized = driver.normalize_waveform(&waveform)?;
    driver.load_waveform_buffer(channel, &normalized, &waveform.phases)?;
    driver.reset_accumulator_and_sync(channel, &waveform.frequencies)?;
    Ok(())
}

/// Reports the cached tone list for one channel.
///
/// The request data is echoed back with `channel` normalised to an integer
/// and the cached `tone_list` and `amplitudes` added.
pub fn get_tone_list(channels: &ChannelStore, uuid: &str, data: Map<String, Value>) -> Envelope {
    respond("get_tone_list", uuid, apply_get(channels, data))
}

fn apply_get(
    channels: &ChannelStore,
    mut data: Map<String, Value>,
) -> Result<Map<String, Value>, HandlerError> {
    let number = integer("channel", require(&data, "channel")?)?;
    data.insert("channel".to_owned(), Value::from(number));

    let Some(channel) = Channel::from_number(number) else {
        return Err(HandlerError::BadChannel { echoed: data });
    };
    let cached = channels.get(channel);
    data.insert("tone_list".to_owned(), cached.tone_list.clone());
    data.insert("amplitudes".to_owned(), cached.amplitudes.clone());
    Ok(data)
}

#[cfg(test)]
mod tests {
    use mockall::Sequence;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;
    use crate::driver::{MockHardwareDriver, NormalizedWaveform, Waveform};

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[fixture]
    fn store() -> ChannelStore {
        ChannelStore::new()
    }

    fn expect_full_sequence(driver: &mut MockHardwareDriver, channel: Channel) {
        let mut sequence = Sequence::new();
        driver
            .expect_generate_waveform()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|tones, _| {
                Ok(Waveform {
                    samples: Vec::new(),
                    phases: vec![0.0; tones.len()],
                    frequencies: tones.to_vec(),
                })
            });
        driver
            .expect_load_bin_list()
            .withf(move |requested, _| *requested == channel)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(()));
        driver
            .expect_normalize_waveform()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(NormalizedWaveform::default()));
        driver
            .expect_load_waveform_buffer()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _, _| Ok(()));
        driver
            .expect_reset_accumulator_and_sync()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(()));
    }

    #[rstest]
    fn drives_the_full_sequence_and_caches(mut store: ChannelStore) {
        let mut driver = MockHardwareDriver::new();
        expect_full_sequence(&mut driver, Channel::Two);

        let data = object(json!({
            "tone_list": [1.5e8, 1.6e8],
            "channel": 2,
            "amplitudes": [1.0, 0.5],
        }));
        let envelope = set_tone_list(&mut driver, &mut store, "u-1", data);

        assert!(envelope.is_ok(), "unexpected error: {}", envelope.error_message());
        assert_eq!(store.get(Channel::Two).tone_list, json!([1.5e8, 1.6e8]));
        assert_eq!(store.get(Channel::One), &ToneConfig::default());
    }

    #[rstest]
    fn caches_even_when_the_driver_fails(mut store: ChannelStore) {
        let mut driver = MockHardwareDriver::new();
        driver
            .expect_generate_waveform()
            .returning(|_, _| Err(DriverError::new("generate_waveform", "dma stalled")));

        let data = object(json!({"tone_list": [1.0e8], "channel": 1, "amplitudes": [1.0]}));
        let envelope = set_tone_list(&mut driver, &mut store, "u-2", data);

        assert_eq!(
            envelope.error_message(),
            "Exception has occured while attempting to upload the waveform"
        );
        assert_eq!(store.get(Channel::One).tone_list, json!([1.0e8]));
        assert_eq!(store.get(Channel::One).amplitudes, json!([1.0]));
    }

    #[rstest]
    #[case::bad_channel(json!({"tone_list": [1.0], "channel": 3, "amplitudes": [1.0]}))]
    #[case::non_numeric(json!({"tone_list": ["a"], "channel": 1, "amplitudes": [1.0]}))]
    #[case::mismatched(json!({"tone_list": [1.0, 2.0], "channel": 1, "amplitudes": [1.0]}))]
    fn waveform_faults_skip_the_driver(mut store: ChannelStore, #[case] data: Value) {
        let mut driver = MockHardwareDriver::new();
        driver.expect_generate_waveform().never();

        let envelope = set_tone_list(&mut driver, &mut store, "u-3", object(data));

        assert_eq!(
            envelope.error_message(),
            "Exception has occured while attempting to upload the waveform"
        );
    }

    #[rstest]
    fn non_numeric_tones_are_cached_before_the_upload_fails(mut store: ChannelStore) {
        let mut driver = MockHardwareDriver::new();
        driver.expect_generate_waveform().never();

        let data = object(json!({"tone_list": ["a", 2.0], "channel": 2, "amplitudes": 0.5}));
        let envelope = set_tone_list(&mut driver, &mut store, "u-8", data);

        assert_eq!(envelope.uuid(), "u-8");
        assert_eq!(
            envelope.error_message(),
            "Exception has occured while attempting to upload the waveform"
        );
        assert_eq!(store.get(Channel::Two).tone_list, json!(["a", 2.0]));
        assert_eq!(store.get(Channel::Two).amplitudes, json!(0.5));
    }

    #[rstest]
    #[case::no_tones(json!({"channel": 1, "amplitudes": []}), "missing required parameters, double check that tone list and amplitude list are present")]
    #[case::no_channel(json!({"tone_list": [], "amplitudes": []}), "missing required parameters, double check that tone list and amplitude list are present")]
    #[case::no_amplitudes(json!({"tone_list": [], "channel": 1}), "missing required parameters, double check that tone list and amplitude list are present")]
    #[case::bad_channel_type(json!({"tone_list": [], "channel": "two", "amplitudes": []}), "invalid parameter data type")]
    fn validates_fields_before_caching(
        mut store: ChannelStore,
        #[case] data: Value,
        #[case] expected: &str,
    ) {
        let mut driver = MockHardwareDriver::new();

        let envelope = set_tone_list(&mut driver, &mut store, "u-4", object(data));

        assert_eq!(envelope.error_message(), expected);
        assert_eq!(store.get(Channel::One), &ToneConfig::default());
    }

    #[rstest]
    fn reads_back_cached_tones_with_normalised_channel(mut store: ChannelStore) {
        store.record(Channel::One, ToneConfig::new(json!([1.0e8]), json!([0.25])));

        let data = object(json!({"channel": "1", "note": "kept"}));
        let envelope = get_tone_list(&store, "u-5", data);

        assert!(envelope.is_ok());
        assert_eq!(envelope.data().get("channel"), Some(&json!(1)));
        assert_eq!(envelope.data().get("tone_list"), Some(&json!([1.0e8])));
        assert_eq!(envelope.data().get("amplitudes"), Some(&json!([0.25])));
        assert_eq!(envelope.data().get("note"), Some(&json!("kept")));
    }

    #[rstest]
    fn unset_channel_reads_as_empty(store: ChannelStore) {
        let envelope = get_tone_list(&store, "u-6", object(json!({"channel": 2})));
        assert!(envelope.is_ok());
        assert_eq!(envelope.data().get("tone_list"), Some(&json!([])));
    }

    #[rstest]
    #[case(json!({"channel": 3}), "bad channel number")]
    #[case(json!({}), "missing required parameters")]
    #[case(json!({"channel": [1]}), "invalid parameter data type")]
    fn rejects_bad_reads(store: ChannelStore, #[case] data: Value, #[case] expected: &str) {
        let envelope = get_tone_list(&store, "u-7", object(data));
        assert_eq!(envelope.error_message(), expected);
        assert_eq!(envelope.uuid(), "u-7");
    }
}
