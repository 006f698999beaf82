use proptest::prelude::*;

use rootio_records::models::{
    any::{read_object, write_object},
    list::TList,
    named::TNamed,
};
use rootio_records::util::context::Context;

/// Name, title, and option bytes for one element
type Element = (String, String, Vec<u8>);

fn arb_element() -> impl Strategy<Value = Element> {
    (
        "[a-zA-Z0-9 ]{0,300}",
        "[a-zA-Z0-9 ]{0,300}",
        prop::collection::vec(any::<u8>(), 0..300),
    )
}

fn arb_list() -> impl Strategy<Value = (String, Vec<Element>)> {
    (
        "[a-zA-Z0-9]{0,20}",
        prop::collection::vec(arb_element(), 0..12),
    )
}

fn build(name: &str, elements: &[Element]) -> TList {
    let mut list = TList::new(name);
    for (name, title, option) in elements {
        list.push(Box::new(TNamed::new(name.as_str(), title.as_str())), option.clone());
    }
    list
}

fn decode(bytes: &[u8]) -> TList {
    let record = read_object(bytes, &mut Context::new()).unwrap().unwrap();
    record.downcast_ref::<TList>().unwrap().clone()
}

proptest! {
    #[test]
    fn prop_list_lengths_agree((name, elements) in arb_list()) {
        let bytes = write_object(&build(&name, &elements)).unwrap();
        let list = decode(&bytes);

        prop_assert_eq!(list.len(), elements.len());
        prop_assert_eq!(list.options().count(), elements.len());
        prop_assert_eq!(list.byte_ranges().len(), elements.len());
    }

    #[test]
    fn prop_byte_ranges_increase((name, elements) in arb_list()) {
        let bytes = write_object(&build(&name, &elements)).unwrap();
        let list = decode(&bytes);

        for range in list.byte_ranges() {
            prop_assert!(range.start <= range.stop);
            prop_assert!(range.stop <= bytes.len());
        }
        for pair in list.byte_ranges().windows(2) {
            prop_assert!(pair[0].start <= pair[1].start);
            prop_assert!(pair[0].stop <= pair[1].start);
        }
    }

    #[test]
    fn prop_list_round_trips((name, elements) in arb_list()) {
        let bytes = write_object(&build(&name, &elements)).unwrap();
        let list = decode(&bytes);
        let again = decode(&write_object(&list.to_writable()).unwrap());

        prop_assert_eq!(again.name(), name.as_str());
        for (index, (name, title, option)) in elements.iter().enumerate() {
            let named = again.get(index).unwrap().downcast_ref::<TNamed>().unwrap();
            prop_assert_eq!(named.name(), name.as_str());
            prop_assert_eq!(named.title(), title.as_str());
            prop_assert_eq!(again.option(index).unwrap(), option.as_slice());
        }
    }
}
