pub mod assembler;
pub mod decoder;
pub mod envelope;

pub use assembler::{Message, PayloadAssembler};
pub use decoder::{decode_data, decode_fields, parse_uplink, Reading};
pub use envelope::{DataRate, Envelope, ReceivedUplink, RxInfo, TxInfo, Uplink};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Catalog, DeviceType};
    use crate::error::LoraSimError;
    use crate::sensor::{SensorEncoder, SensorKind};

    fn assembler() -> PayloadAssembler {
        PayloadAssembler::new(
            Catalog::builtin(),
            Envelope::default(),
            SensorEncoder::with_seed(7),
        )
    }

    fn data_of(message: &Message) -> Vec<u8> {
        let uplink = parse_uplink(&message.body).unwrap();
        decode_data(&uplink.data).unwrap()
    }

    #[test]
    fn test_smart_lights_topic_wraps() {
        let mut assembler = assembler();
        let first = assembler.assemble(DeviceType::SmartLights, 0).unwrap();
        let wrapped = assembler.assemble(DeviceType::SmartLights, 7).unwrap();
        assert_eq!(first.topic, "application/17/node/0004a30b00000001/rx");
        assert_eq!(wrapped.topic, first.topic);
    }

    #[test]
    fn test_artesian_well_topic_is_fixed() {
        let mut assembler = assembler();
        for tick in 0..20 {
            let message = assembler.assemble(DeviceType::ArtesianWells, tick).unwrap();
            assert_eq!(message.topic, "application/17/node/0004a30b0040100c/rx");
            let readings = decode_fields(
                DeviceType::ArtesianWells.default_sensors(),
                &data_of(&message),
            )
            .unwrap();
            assert_eq!(readings.len(), 3);
        }
    }

    #[test]
    fn test_water_tank_data_layout() {
        let mut assembler = assembler();
        let message = assembler.assemble(DeviceType::WaterTankLevels, 5).unwrap();
        let data = data_of(&message);

        assert_eq!(data.len(), 6);
        assert_eq!(data[0], SensorKind::Distance.type_code());
        assert_eq!(data[3], SensorKind::BoardVoltage.type_code());

        let readings = decode_fields(&[SensorKind::Distance, SensorKind::BoardVoltage], &data)
            .unwrap();
        assert!(readings[0].value <= 4096);
        assert!(readings[1].value <= 4200);
    }

    #[test]
    fn test_hidrometer_end_to_end() {
        let mut assembler = assembler();
        let message = assembler.assemble(DeviceType::Hidrometers, 2).unwrap();
        assert_eq!(message.topic, "application/17/node/0004a30b00101003/rx");

        let uplink = parse_uplink(&message.body).unwrap();
        assert_eq!(uplink.node_name, "Hidrometer_3");
        assert_eq!(uplink.dev_eui, "0004a30b00101003");

        let data = decode_data(&uplink.data).unwrap();
        assert_eq!(data.len(), 7);
        assert_eq!(&data[..4], &[0x0b, 0x00, 0x00, 0x02]);

        let readings = decode_fields(&[SensorKind::Counter, SensorKind::BoardVoltage], &data)
            .unwrap();
        assert_eq!(
            readings[0],
            Reading {
                kind: SensorKind::Counter,
                value: 2
            }
        );
        assert_eq!(readings[1].kind, SensorKind::BoardVoltage);
    }

    #[test]
    fn test_smart_lights_field_order() {
        let mut assembler = assembler();
        let message = assembler.assemble(DeviceType::SmartLights, 9).unwrap();
        let data = data_of(&message);
        let readings = decode_fields(DeviceType::SmartLights.default_sensors(), &data).unwrap();
        let kinds: Vec<SensorKind> = readings.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SensorKind::Counter,
                SensorKind::CounterAlt,
                SensorKind::CounterAlt,
                SensorKind::BoardVoltage
            ]
        );
        assert_eq!(readings[0].value, 9);
        assert_eq!(data.len(), 4 + 3 + 3 + 3);
    }

    #[test]
    fn test_body_matches_bridge_format() {
        let catalog = Catalog::from_yaml_str(
            r#"
Hidrometers:
  sensors: [counter]
  devices:
    - { node_name: Hidrometer_1, dev_eui: "0004a30b00101001" }
    - { node_name: Hidrometer_2, dev_eui: "0004a30b00101002" }
    - { node_name: Hidrometer_3, dev_eui: "0004a30b00101003" }
"#,
        )
        .unwrap();
        let mut assembler =
            PayloadAssembler::new(catalog, Envelope::default(), SensorEncoder::with_seed(0));

        let message = assembler.assemble(DeviceType::Hidrometers, 2).unwrap();
        let expected = concat!(
            r#"{"applicationID":"17","applicationName":"SmartCampusMaua","#,
            r#""nodeName":"Hidrometer_3","devEUI":"0004a30b00101003","#,
            r#""rxInfo":[{"mac":"7276ff000b031df7","time":"2024-03-28T22:33:26.728817Z","#,
            r#""rssi":-97,"loRaSNR":11.2,"name":"IMT-kerlink-blocoW2","#,
            r#""latitude":-23.64946,"longitude":-46.57367,"altitude":777},"#,
            r#"{"mac":"7276ff00080801db","time":"2024-03-28T22:33:25Z","#,
            r#""rssi":-100,"loRaSNR":11.5,"name":"IMT-kerlink-blocoH","#,
            r#""latitude":-23.64891,"longitude":-46.57413,"altitude":758}],"#,
            r#""txInfo":{"frequency":916200000,"dataRate":{"modulation":"LORA","#,
            r#""bandwidth":125,"spreadFactor":9},"adr":true,"codeRate":"4/5"},"#,
            r#""fCnt":135,"fPort":100,"data":"CwAAAg=="}"#
        );
        assert_eq!(message.body, expected);
    }

    #[test]
    fn test_overflowing_counter_fails_the_message() {
        let mut assembler = assembler();
        let result = assembler.assemble(DeviceType::Hidrometers, 0x0100_0000);
        assert!(matches!(result, Err(LoraSimError::EncodingError(_))));

        // Types without a counter are unaffected.
        assert!(assembler
            .assemble(DeviceType::WaterTankLevels, 0x0100_0000)
            .is_ok());
    }

    #[test]
    fn test_decode_rejects_wrong_type_code() {
        let err = decode_fields(&[SensorKind::Pressure], &[0x13, 0x00, 0x01]).unwrap_err();
        assert!(matches!(err, LoraSimError::InvalidPayload(_)));
    }

    #[test]
    fn test_decode_rejects_short_and_trailing_bytes() {
        assert!(decode_fields(&[SensorKind::Counter], &[0x0b, 0x00]).is_err());
        assert!(decode_fields(&[SensorKind::Distance], &[0x13, 0x00, 0x01, 0xff]).is_err());
    }

    #[test]
    fn test_envelope_round_trips() {
        let mut assembler = assembler();
        let envelope = assembler.envelope().clone();
        assert_eq!(envelope, Envelope::default());
        let message = assembler.assemble(DeviceType::WaterTankLevels, 0).unwrap();
        let uplink = parse_uplink(&message.body).unwrap();
        assert_eq!(uplink.application_id, envelope.application_id);
        assert_eq!(uplink.application_name, envelope.application_name);
        assert_eq!(uplink.rx_info, envelope.rx_info);
        assert_eq!(uplink.tx_info, envelope.tx_info);
        assert_eq!(uplink.f_cnt, 135);
        assert_eq!(uplink.f_port, 100);
    }
}
