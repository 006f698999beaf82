#[cfg(test)]
mod list_tests {
    use std::env::current_dir;
    use std::fs::File;
    use std::io::Read;

    use crate::{
        error::record::RecordError,
        models::{
            any::{read_object, write_object},
            list::{ByteRange, TList},
            named::TNamed,
            object::TObject,
            record::Record,
        },
        util::context::Context,
    };

    fn fixture(name: &str) -> Vec<u8> {
        let path = current_dir()
            .unwrap()
            .as_path()
            .join("test_data/records")
            .join(name);
        let mut file = File::open(path).unwrap();
        let mut bytes = vec![];
        file.read_to_end(&mut bytes).unwrap();
        bytes
    }

    fn read_list(bytes: &[u8], ctx: &mut Context) -> Result<TList, RecordError> {
        let record = read_object(bytes, ctx)?.unwrap();
        Ok(record.downcast_ref::<TList>().unwrap().clone())
    }

    fn named_at(list: &TList, index: usize) -> &TNamed {
        list.get(index).unwrap().downcast_ref::<TNamed>().unwrap()
    }

    fn two_named() -> TList {
        let mut list = TList::new("");
        list.push(Box::new(TNamed::new("h1", "")), vec![]);
        list.push(Box::new(TNamed::new("h2", "hist")), vec![]);
        list
    }

    #[test]
    fn can_read_two_named() {
        let bytes = fixture("ListTwoNamed");
        let list = read_list(&bytes, &mut Context::new()).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(named_at(&list, 0).name(), "h1");
        assert_eq!(named_at(&list, 0).title(), "");
        assert_eq!(named_at(&list, 1).name(), "h2");
        assert_eq!(named_at(&list, 1).title(), "hist");
        assert_eq!(list.option(0).unwrap(), b"");
        assert_eq!(list.option(1).unwrap(), b"");
        assert_eq!(list.instance().instance_version, 5);
    }

    #[test]
    fn can_downcast_elements_of_local_list() {
        let list = two_named();

        let titles: Vec<&str> = list
            .iter()
            .filter_map(|record| record.downcast_ref::<TNamed>())
            .map(TNamed::title)
            .collect();

        assert_eq!(titles, vec!["", "hist"]);
        assert!(list.get(0).unwrap().is::<TNamed>());
        assert!(!list.get(1).unwrap().is::<TList>());
    }

    #[test]
    fn can_read_byte_ranges() {
        let bytes = fixture("ListTwoNamed");
        let list = read_list(&bytes, &mut Context::new()).unwrap();

        assert_eq!(
            list.byte_ranges(),
            &[
                ByteRange { start: 35, stop: 71 },
                ByteRange { start: 71, stop: 104 }
            ]
        );
        assert_eq!(list.byte_ranges()[1].stop, bytes.len());
    }

    #[test]
    fn byte_ranges_reslice_source() {
        let bytes = fixture("ListTwoNamed");
        let list = read_list(&bytes, &mut Context::new()).unwrap();

        let range = list.byte_ranges()[0];
        let element = &bytes[range.start..range.stop];

        // The first element defines its class, so it decodes on its own
        let record = read_object(element, &mut Context::new()).unwrap().unwrap();
        assert_eq!(record.downcast_ref::<TNamed>().unwrap().name(), "h1");
    }

    #[test]
    fn can_round_trip_two_named() {
        let bytes = fixture("ListTwoNamed");
        let list = read_list(&bytes, &mut Context::new()).unwrap();

        let written = write_object(&list.to_writable()).unwrap();
        let decoded = read_list(&written, &mut Context::new()).unwrap();

        assert_eq!(decoded.len(), list.len());
        for index in 0..list.len() {
            assert_eq!(named_at(&decoded, index).name(), named_at(&list, index).name());
            assert_eq!(named_at(&decoded, index).title(), named_at(&list, index).title());
            assert_eq!(decoded.option(index).unwrap(), list.option(index).unwrap());
        }
        assert_eq!(decoded.byte_ranges().len(), 2);
        assert_eq!(decoded.byte_ranges()[1].stop, written.len());
    }

    #[test]
    fn can_round_trip_built_list() {
        let mut list = two_named();
        list.push(Box::new(TObject::new(7, 0)), b"same".to_vec());

        let written = write_object(&list).unwrap();
        let decoded = read_list(&written, &mut Context::new()).unwrap();

        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded.option(2).unwrap(), b"same");
        let object = decoded.get(2).unwrap().downcast_ref::<TObject>().unwrap();
        assert_eq!(object.unique_id(), 7);
    }

    #[test]
    fn can_round_trip_nested_list() {
        let mut outer = TList::new("outer");
        outer.push(Box::new(two_named()), b"inner".to_vec());
        outer.push(Box::new(TNamed::new("h3", "")), vec![]);

        let written = write_object(&outer).unwrap();
        let decoded = read_list(&written, &mut Context::new()).unwrap();

        let inner = decoded.get(0).unwrap().downcast_ref::<TList>().unwrap();
        assert_eq!(named_at(inner, 1).title(), "hist");
        assert_eq!(decoded.option(0).unwrap(), b"inner");
        assert_eq!(named_at(&decoded, 1).name(), "h3");
        assert_eq!(decoded.name(), "outer");
    }

    #[test]
    fn can_round_trip_long_option() {
        let mut list = TList::new("");
        list.push(Box::new(TNamed::new("h1", "")), vec![0xab; 300]);

        let written = write_object(&list).unwrap();
        let decoded = read_list(&written, &mut Context::new()).unwrap();

        assert_eq!(decoded.option(0).unwrap(), &[0xab_u8; 300][..]);
    }

    #[test]
    fn to_writable_drops_byte_ranges() {
        let bytes = fixture("ListTwoNamed");
        let list = read_list(&bytes, &mut Context::new()).unwrap();

        let writable = list.to_writable();

        assert!(writable.byte_ranges().is_empty());
        assert_eq!(writable.len(), 2);
        assert_eq!(named_at(&writable, 1).title(), "hist");
    }

    #[test]
    fn push_drops_byte_ranges() {
        let bytes = fixture("ListTwoNamed");
        let mut list = read_list(&bytes, &mut Context::new()).unwrap();

        list.push(Box::new(TNamed::new("h3", "")), vec![]);

        assert!(list.byte_ranges().is_empty());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn cant_get_out_of_range() {
        let list = two_named();

        assert!(matches!(
            list.get(2),
            Err(RecordError::IndexOutOfRange { index: 2, len: 2, .. })
        ));
        assert!(matches!(
            list.option(5),
            Err(RecordError::IndexOutOfRange { index: 5, len: 2, .. })
        ));
    }

    #[test]
    fn cant_build_from_mismatched_parts() {
        let elements: Vec<Box<dyn Record>> = vec![Box::new(TNamed::new("h1", ""))];

        let result = TList::from_parts("", elements, vec![vec![], vec![]]);

        assert!(matches!(
            result,
            Err(RecordError::InconsistentLength {
                declared: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn can_build_from_parts() {
        let elements: Vec<Box<dyn Record>> = vec![
            Box::new(TNamed::new("h1", "")),
            Box::new(TNamed::new("h2", "hist")),
        ];

        let list = TList::from_parts("", elements, vec![vec![], b"x".to_vec()]).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.options().collect::<Vec<_>>(), vec![&b""[..], &b"x"[..]]);
        assert_eq!(
            list.iter().map(|record| record.class_name()).collect::<Vec<_>>(),
            vec!["TNamed", "TNamed"]
        );
    }

    #[test]
    fn cant_read_negative_size() {
        let mut bytes = fixture("ListTwoNamed");
        // The element count follows the outer framing, header, identity, and empty name
        bytes[31..35].copy_from_slice(&(-1i32).to_be_bytes());

        let result = read_list(&bytes, &mut Context::new());

        assert!(matches!(
            result,
            Err(RecordError::InconsistentLength { declared: -1, .. })
        ));
    }

    #[test]
    fn cant_read_unknown_element_class() {
        let bytes = fixture("ListUnknownClass");
        let mut ctx = Context::new().with_source("ListUnknownClass");

        let result = read_list(&bytes, &mut ctx);

        match result {
            Err(RecordError::UnresolvedType { tag, offset, source }) => {
                assert_eq!(tag, "TH1F");
                assert_eq!(offset, 35);
                assert_eq!(source, "ListUnknownClass");
            }
            other => panic!("expected UnresolvedType, got {other:?}"),
        }
    }

    #[test]
    fn byte_count_mismatch_is_strict_by_default() {
        let mut bytes = fixture("ListTwoNamed");
        // Claim one more byte than the list header really covers
        bytes[17] += 1;

        let strict = read_list(&bytes, &mut Context::new());
        assert!(matches!(
            strict,
            Err(RecordError::NumBytesMismatch { class, .. }) if class == "TList"
        ));

        let mut lenient = Context::new().with_num_bytes_check(false);
        let list = read_list(&bytes, &mut lenient).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn exchange_form_omits_options() {
        let mut list = two_named();
        list.push(Box::new(TNamed::new("h3", "")), b"not projected".to_vec());

        let form = list.to_exchange_form();

        assert_eq!(form["_typename"], "TList");
        assert_eq!(form["name"], "TList");
        assert_eq!(form["arr"].len(), 3);
        assert_eq!(form["arr"][1]["fTitle"], "hist");
        // Options never appear in this projection, whatever the list holds
        assert_eq!(form["opt"].len(), 0);
    }

    #[test]
    fn can_display_list() {
        assert_eq!(two_named().to_string(), "<TList of 2 items>");
    }
}
