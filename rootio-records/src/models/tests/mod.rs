mod test_list;
